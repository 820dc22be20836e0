pub use builder::{ConsumerStage, InteractionStage, PactBuilder, RequestStage, ResponseStage};
pub use client::{PactClient, PactRequestBuilder};
pub use config::PactConfig;
pub use session::PactSession;
pub use verify::{InteractionFailure, VerificationHandle, VerificationReport};

mod builder;
pub mod client;
mod config;
mod output;
mod session;
mod verify;
