use crate::{
    api::{client::PactClient, verify::VerificationHandle},
    common::data::{Interaction, ObservedRequest, UnexpectedRequest},
    server::{registry::Registry, InteractionRegistry, MockEndpoint},
    Error,
};
use std::{fmt, net::SocketAddr, sync::Arc};
use url::Url;

/// A started pact: the declared interactions and the mock endpoint serving them.
///
/// The mock endpoint stays up as long as the session, a client or a verification handle of it
/// is alive.
pub struct PactSession {
    consumer: String,
    provider: String,
    registry: Arc<InteractionRegistry>,
    endpoint: Arc<MockEndpoint>,
    client: PactClient,
    verification: VerificationHandle,
}

impl PactSession {
    pub(crate) fn new(
        consumer: String,
        provider: String,
        registry: Arc<InteractionRegistry>,
        endpoint: Arc<MockEndpoint>,
        client: PactClient,
        verification: VerificationHandle,
    ) -> Self {
        Self {
            consumer,
            provider,
            registry,
            endpoint,
            client,
            verification,
        }
    }

    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The loopback address the mock endpoint listens on.
    pub fn address(&self) -> &SocketAddr {
        self.endpoint.address()
    }

    /// The URL relative request paths are resolved against, including the base path.
    pub fn base_url(&self) -> &Url {
        self.client.base_url()
    }

    /// A client preconfigured for the mock endpoint. Every call returns an independent client.
    pub fn client(&self) -> PactClient {
        self.client.clone()
    }

    pub fn verification_handle(&self) -> VerificationHandle {
        self.verification.clone()
    }

    /// See [VerificationHandle::verify].
    pub fn verify(&self) -> Result<(), Error> {
        self.verification.verify()
    }

    /// See [VerificationHandle::assert].
    pub fn assert(&self) {
        self.verification.assert()
    }

    /// A snapshot of the interactions including their matched state and recorded mismatches.
    pub fn interactions(&self) -> Vec<Interaction> {
        self.registry.interactions()
    }

    /// Every request the mock endpoint received, in arrival order.
    pub fn received_requests(&self) -> Vec<ObservedRequest> {
        self.registry.history()
    }

    pub fn unexpected_requests(&self) -> Vec<UnexpectedRequest> {
        self.registry.unexpected_requests()
    }
}

impl fmt::Debug for PactSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PactSession")
            .field("consumer", &self.consumer)
            .field("provider", &self.provider)
            .field("address", self.endpoint.address())
            .finish()
    }
}
