use crate::{
    api::output,
    common::data::{ExpectedRequest, MismatchDetail, UnexpectedRequest},
    server::{registry::Registry, InteractionRegistry, MockEndpoint},
    Error,
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// An interaction that was not satisfied cleanly: it was never invoked, or requests that were
/// attributed to it did not match.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InteractionFailure {
    /// Position of the interaction in registration order, starting at 0.
    pub index: usize,
    pub description: Option<String>,
    pub provider_state: Option<String>,
    pub request: ExpectedRequest,
    pub matched: bool,
    pub mismatches: Vec<MismatchDetail>,
}

/// Everything verification found wrong with a pact session.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VerificationReport {
    pub consumer: String,
    pub provider: String,
    pub failures: Vec<InteractionFailure>,
    pub unexpected: Vec<UnexpectedRequest>,
}

impl VerificationReport {
    /// True if nothing went wrong.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.unexpected.is_empty()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = output::render_report(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Checks after the test ran that every interaction of a session was satisfied.
///
/// The handle keeps the mock endpoint alive, so it stays usable after the session or the
/// client were dropped. Verification only reads the recorded state and can be repeated.
#[derive(Clone)]
pub struct VerificationHandle {
    consumer: String,
    provider: String,
    registry: Arc<InteractionRegistry>,
    _endpoint: Arc<MockEndpoint>,
}

impl VerificationHandle {
    pub(crate) fn new(
        consumer: String,
        provider: String,
        registry: Arc<InteractionRegistry>,
        endpoint: Arc<MockEndpoint>,
    ) -> Self {
        Self {
            consumer,
            provider,
            registry,
            _endpoint: endpoint,
        }
    }

    /// Succeeds if every interaction was matched exactly once, no received request mismatched
    /// and no request arrived that no interaction expected.
    pub fn verify(&self) -> Result<(), Error> {
        let report = self.report();
        if report.is_success() {
            tracing::debug!(
                "Pact between {} and {} verified",
                self.consumer,
                self.provider
            );
            return Ok(());
        }

        tracing::debug!(
            "Pact between {} and {} failed verification with {} failing interaction(s) and {} unexpected request(s)",
            self.consumer,
            self.provider,
            report.failures.len(),
            report.unexpected.len()
        );
        Err(Error::ExpectationViolation(report))
    }

    /// Like [VerificationHandle::verify], but panics with the verification report on failure.
    pub fn assert(&self) {
        if let Err(err) = self.verify() {
            panic!("{}", err);
        }
    }

    /// The current verification state without turning it into an error.
    pub fn report(&self) -> VerificationReport {
        let (failures, unexpected) = self.registry.failures();
        VerificationReport {
            consumer: self.consumer.clone(),
            provider: self.provider.clone(),
            failures,
            unexpected,
        }
    }
}

impl fmt::Debug for VerificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationHandle")
            .field("consumer", &self.consumer)
            .field("provider", &self.provider)
            .finish()
    }
}
