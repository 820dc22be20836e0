use crate::{common::data::Method, common::util::Join, server::MockEndpoint, Error as PactError};
use bytes::Bytes;
use http::{header::AUTHORIZATION, header::CONTENT_TYPE, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::Serialize;
use std::{fmt, future::Future, sync::Arc};
use thiserror::Error;
use tokio::{runtime::Handle, task::JoinHandle};
use url::Url;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot send request: {0}")]
    HyperError(#[from] hyper::Error),
    #[error("cannot send request: {0}")]
    HyperUtilError(#[from] hyper_util::client::legacy::Error),
    #[error("runtime error: {0}")]
    RuntimeError(#[from] tokio::task::JoinError),
    #[error("the mock endpoint runtime is no longer available")]
    RuntimeUnavailable,
}

/// An HTTP client preconfigured with the address of a session's mock endpoint.
///
/// Relative paths are resolved against the base URL, which includes the configured base path.
/// Paths starting with `/` are resolved against the endpoint's root. Requests run on the
/// endpoint's own runtime, so both the blocking and the async methods work from any thread or
/// executor.
///
/// **Example**:
/// ```
/// use pactmock::prelude::*;
/// use serde_json::json;
///
/// let (mut client, verification) = PactBuilder::new()
///     .service_consumer("Consumer")
///     .has_pact_with("Provider")
///     .upon_receiving("a request for something")
///     .with(ExpectedRequest::new(GET, "/api/test/something")
///         .header("Authorization", "Bearer accesstoken"))
///     .unwrap()
///     .will_respond_with(ExpectedResponse::new(200).json_body(json!({ "SomeProperty": "test" })))
///     .unwrap()
///     .client()
///     .unwrap();
///
/// client.set_bearer_token("accesstoken");
/// let response = client.get("/api/test/something").unwrap();
///
/// assert_eq!(response.status(), 200);
/// verification.verify().unwrap();
/// ```
#[derive(Clone)]
pub struct PactClient {
    base_url: Url,
    default_headers: Vec<(String, String)>,
    client: Arc<Client<HttpConnector, Full<Bytes>>>,
    endpoint: Arc<MockEndpoint>,
}

impl PactClient {
    pub(crate) fn new(endpoint: Arc<MockEndpoint>, base_path: Option<&str>) -> Result<Self, PactError> {
        let base = format!(
            "http://{}{}/",
            endpoint.address(),
            base_path.unwrap_or_default()
        );
        let base_url = Url::parse(&base).map_err(|err| {
            PactError::Construction(format!("invalid base URL {}: {}", base, err))
        })?;

        Ok(Self {
            base_url,
            default_headers: Vec::new(),
            client: Arc::new(Client::builder(TokioExecutor::new()).build_http()),
            endpoint,
        })
    }

    /// The URL every relative request path is resolved against. Always ends with `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a path against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, PactError> {
        self.base_url.join(path).map_err(|err| {
            PactError::Construction(format!("cannot resolve request path {:?}: {}", path, err))
        })
    }

    /// Sends `Authorization: Bearer <token>` with every following request.
    pub fn set_bearer_token<T: fmt::Display>(&mut self, token: T) {
        self.default_header(AUTHORIZATION.as_str(), format!("Bearer {}", token));
    }

    /// Sends the header with every following request, replacing an earlier default header with
    /// the same name.
    pub fn default_header<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        let name = name.into();
        self.default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value.into()));
    }

    pub fn request(&self, method: Method, path: &str) -> PactRequestBuilder<'_> {
        PactRequestBuilder {
            client: self,
            method,
            path: path.to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    pub fn get(&self, path: &str) -> Result<Response<Bytes>, PactError> {
        self.request(Method::GET, path).send()
    }

    pub async fn get_async(&self, path: &str) -> Result<Response<Bytes>, PactError> {
        self.request(Method::GET, path).send_async().await
    }

    pub fn delete(&self, path: &str) -> Result<Response<Bytes>, PactError> {
        self.request(Method::DELETE, path).send()
    }

    pub fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response<Bytes>, PactError> {
        self.request(Method::POST, path).json(body).send()
    }

    pub fn put_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response<Bytes>, PactError> {
        self.request(Method::PUT, path).json(body).send()
    }

    pub fn patch_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response<Bytes>, PactError> {
        self.request(Method::PATCH, path).json(body).send()
    }

    fn spawn<F, T>(&self, future: F) -> Result<JoinHandle<T>, Error>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handle: Handle = self.endpoint.handle().ok_or(Error::RuntimeUnavailable)?;
        Ok(handle.spawn(future))
    }
}

impl fmt::Debug for PactClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PactClient")
            .field("base_url", &self.base_url.as_str())
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

/// A single request to the mock endpoint, sent with [PactRequestBuilder::send] or
/// [PactRequestBuilder::send_async].
pub struct PactRequestBuilder<'a> {
    client: &'a PactClient,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Bytes,
    error: Option<PactError>,
}

impl<'a> PactRequestBuilder<'a> {
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends a query parameter. Parameters already contained in the path are kept.
    pub fn query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes the value as the JSON request body and sets the content type accordingly.
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => {
                self.body = Bytes::from(bytes);
                if !self
                    .headers
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()))
                {
                    self.headers
                        .push((CONTENT_TYPE.to_string(), "application/json".to_string()));
                }
            }
            Err(err) => {
                self.error = Some(PactError::Construction(format!(
                    "cannot serialize request body: {}",
                    err
                )))
            }
        }
        self
    }

    /// Sends the request and blocks until the complete response was received.
    pub fn send(self) -> Result<Response<Bytes>, PactError> {
        let join_handle = self.dispatch()?;
        let result = join_handle.join().map_err(Error::RuntimeError)?;
        Ok(result?)
    }

    pub async fn send_async(self) -> Result<Response<Bytes>, PactError> {
        let join_handle = self.dispatch()?;
        let result = join_handle.await.map_err(Error::RuntimeError)?;
        Ok(result?)
    }

    fn dispatch(self) -> Result<JoinHandle<Result<Response<Bytes>, Error>>, PactError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut url = self.client.url(&self.path)?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        let mut builder = Request::builder()
            .method(http::Method::from(self.method))
            .uri(url.as_str());
        for (name, value) in self.client.default_headers.iter().chain(self.headers.iter()) {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let request = builder.body(Full::new(self.body)).map_err(|err| {
            PactError::Construction(format!("cannot build request to {}: {}", url, err))
        })?;

        tracing::trace!("Sending {} {}", self.method, url);

        let client = self.client.client.clone();
        Ok(self.client.spawn(async move {
            let response = client.request(request).await?;
            let (parts, body) = response.into_parts();
            let body = body.collect().await?.to_bytes();
            Ok::<_, Error>(Response::from_parts(parts, body))
        })?)
    }
}
