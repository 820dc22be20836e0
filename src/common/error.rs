use crate::{
    api::{client, VerificationReport},
    server,
};
use thiserror::Error;

/// The error type of this crate.
///
/// Structural mismatches between received requests and interactions are never returned while
/// the mock endpoint is serving traffic. They are accumulated and only surface through
/// [Error::ExpectationViolation] when a session is verified.
#[derive(Error, Debug)]
pub enum Error {
    /// The pact was specified with invalid data, e.g. a malformed path or header.
    #[error("invalid pact definition: {0}")]
    Construction(String),
    /// Verification found interactions that were not matched or requests that did not match.
    #[error("{0}")]
    ExpectationViolation(VerificationReport),
    /// The mock endpoint could not be started or stopped.
    #[error("mock endpoint transport error: {0}")]
    Transport(#[from] server::Error),
    /// The preconfigured client could not send a request to the mock endpoint.
    #[error("client error: {0}")]
    Client(#[from] client::Error),
}

impl Error {
    /// The verification report if this is an [Error::ExpectationViolation].
    pub fn report(&self) -> Option<&VerificationReport> {
        match self {
            Error::ExpectationViolation(report) => Some(report),
            _ => None,
        }
    }
}
