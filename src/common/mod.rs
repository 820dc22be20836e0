pub(crate) mod data;
pub(crate) mod error;
pub(crate) mod runtime;
pub mod util;
