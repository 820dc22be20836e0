use crate::{
    api::{client::PactClient, config::PactConfig, session::PactSession, verify::VerificationHandle},
    common::{
        data::{ExpectedRequest, ExpectedResponse, Interaction},
        util::{apply_base_path, Diagnostics},
    },
    server::{InteractionRegistry, MockEndpoint},
    Error,
};
use http::{HeaderName, HeaderValue, StatusCode};
use std::sync::Arc;

/// Entry point for declaring a pact.
///
/// The builder is staged: every stage only offers the calls that are valid at that point, so
/// `service_consumer` → `has_pact_with` → `[given]` → `[upon_receiving]` → `with` →
/// `will_respond_with` is enforced at compile time. After the first interaction, more
/// interactions can be added before the mock endpoint is started with
/// [ResponseStage::client] or [ResponseStage::build].
///
/// **Example**:
/// ```
/// use pactmock::prelude::*;
///
/// let session = PactBuilder::new()
///     .service_consumer("Me")
///     .has_pact_with("Someone")
///     .given("something given")
///     .upon_receiving("upon receiving stuff")
///     .with(ExpectedRequest::new(GET, "/api/test/something").query("a=b&test=quest"))
///     .unwrap()
///     .will_respond_with(ExpectedResponse::new(200))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let response = session.client().get("/api/test/something?test=quest&a=b").unwrap();
///
/// assert_eq!(response.status(), 200);
/// session.verify().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct PactBuilder {
    config: PactConfig,
}

impl PactBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PactConfig) -> Self {
        Self { config }
    }

    /// Names the consumer, i.e. the client application this pact is written for.
    pub fn service_consumer<S: Into<String>>(self, consumer: S) -> ConsumerStage {
        ConsumerStage {
            config: self.config,
            consumer: consumer.into(),
        }
    }
}

#[derive(Debug)]
pub struct ConsumerStage {
    config: PactConfig,
    consumer: String,
}

impl ConsumerStage {
    /// Names the provider, i.e. the service the mock endpoint stands in for.
    pub fn has_pact_with<S: Into<String>>(self, provider: S) -> InteractionStage {
        InteractionStage::new(Pact {
            config: self.config,
            consumer: self.consumer,
            provider: provider.into(),
            interactions: Vec::new(),
        })
    }
}

/// The declarations collected so far.
#[derive(Debug)]
struct Pact {
    config: PactConfig,
    consumer: String,
    provider: String,
    interactions: Vec<Interaction>,
}

/// Describes the next interaction. Provider state and description are documentation only and
/// do not take part in matching.
#[derive(Debug)]
pub struct InteractionStage {
    pact: Pact,
    provider_state: Option<String>,
    description: Option<String>,
}

impl InteractionStage {
    fn new(pact: Pact) -> Self {
        Self {
            pact,
            provider_state: None,
            description: None,
        }
    }

    /// The state the provider is expected to be in for this interaction.
    pub fn given<S: Into<String>>(mut self, provider_state: S) -> Self {
        self.provider_state = Some(provider_state.into());
        self
    }

    pub fn upon_receiving<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares the request of this interaction. Fails if the request is malformed, e.g. has a
    /// path containing whitespace or an invalid header.
    pub fn with(self, request: ExpectedRequest) -> Result<RequestStage, Error> {
        let request = validate_request(request, self.pact.config.normalized_base_path().as_deref())?;

        tracing::trace!(
            "Declared request {} {} for pact between {} and {}",
            request.method,
            request.path,
            self.pact.consumer,
            self.pact.provider
        );

        Ok(RequestStage {
            pact: self.pact,
            provider_state: self.provider_state,
            description: self.description,
            request,
        })
    }
}

#[derive(Debug)]
pub struct RequestStage {
    pact: Pact,
    provider_state: Option<String>,
    description: Option<String>,
    request: ExpectedRequest,
}

impl RequestStage {
    /// Declares the response the mock endpoint sends for the request and completes the
    /// interaction.
    pub fn will_respond_with(mut self, response: ExpectedResponse) -> Result<ResponseStage, Error> {
        validate_response(&response)?;

        self.pact.interactions.push(Interaction::new(
            self.provider_state,
            self.description,
            self.request,
            response,
        ));

        Ok(ResponseStage { pact: self.pact })
    }
}

/// At least one interaction is complete. Either declare the next one or start the mock
/// endpoint.
#[derive(Debug)]
pub struct ResponseStage {
    pact: Pact,
}

impl ResponseStage {
    pub fn given<S: Into<String>>(self, provider_state: S) -> InteractionStage {
        InteractionStage::new(self.pact).given(provider_state)
    }

    pub fn upon_receiving<S: Into<String>>(self, description: S) -> InteractionStage {
        InteractionStage::new(self.pact).upon_receiving(description)
    }

    pub fn with(self, request: ExpectedRequest) -> Result<RequestStage, Error> {
        InteractionStage::new(self.pact).with(request)
    }

    /// The interactions declared so far, in registration order.
    pub fn interactions(&self) -> &[Interaction] {
        &self.pact.interactions
    }

    /// Starts the mock endpoint and returns the session owning it.
    pub fn build(self) -> Result<PactSession, Error> {
        let Pact {
            config,
            consumer,
            provider,
            interactions,
        } = self.pact;

        let base_path = config.normalized_base_path();
        let registry = Arc::new(InteractionRegistry::new(
            interactions,
            Diagnostics::new(config.sink()),
        ));
        let endpoint = Arc::new(MockEndpoint::start(
            registry.clone(),
            config.get_port(),
            config.get_print_access_log(),
        )?);

        tracing::debug!(
            "Started mock endpoint for pact between {} and {} on {}",
            consumer,
            provider,
            endpoint.address()
        );

        let client = PactClient::new(endpoint.clone(), base_path.as_deref())?;
        let verification = VerificationHandle::new(
            consumer.clone(),
            provider.clone(),
            registry.clone(),
            endpoint.clone(),
        );

        Ok(PactSession::new(
            consumer,
            provider,
            registry,
            endpoint,
            client,
            verification,
        ))
    }

    /// Starts the mock endpoint and returns a client configured for it together with the handle
    /// to verify the pact afterwards. The endpoint stops once both are dropped.
    pub fn client(self) -> Result<(PactClient, VerificationHandle), Error> {
        let session = self.build()?;
        Ok((session.client(), session.verification_handle()))
    }
}

fn validate_request(
    mut request: ExpectedRequest,
    base_path: Option<&str>,
) -> Result<ExpectedRequest, Error> {
    if request.path.is_empty() {
        return Err(Error::Construction("request path must not be empty".to_string()));
    }

    if let Some(c) = request
        .path
        .chars()
        .find(|c| c.is_whitespace() || *c == '?' || *c == '#')
    {
        return Err(Error::Construction(format!(
            "request path {:?} must not contain {:?}, declare queries with ExpectedRequest::query",
            request.path, c
        )));
    }

    request.path = apply_base_path(base_path, &request.path);

    if let Some(query) = &request.query {
        if query.contains('#') {
            return Err(Error::Construction(format!(
                "request query {:?} must not contain a fragment",
                query
            )));
        }
        request.query = Some(query.trim_start_matches('?').to_string());
    }

    validate_headers(&request.headers)?;

    Ok(request)
}

fn validate_response(response: &ExpectedResponse) -> Result<(), Error> {
    StatusCode::from_u16(response.status).map_err(|err| {
        Error::Construction(format!("invalid response status {}: {}", response.status, err))
    })?;

    validate_headers(&response.headers)
}

fn validate_headers(headers: &[(String, String)]) -> Result<(), Error> {
    for (name, value) in headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            Error::Construction(format!("invalid header name {:?}: {}", name, err))
        })?;
        HeaderValue::from_str(value).map_err(|err| {
            Error::Construction(format!("invalid value for header {:?}: {}", name, err))
        })?;
    }

    Ok(())
}
