use crate::{
    common::data::{ErrorResponse, ExpectedResponse, ObservedRequest},
    server::{
        handler::Error::{
            InvalidHeader, ResponseBodyConversionError, ResponseBodySerializeError,
        },
        registry::{Registry, ServeOutcome},
    },
};
use async_trait::async_trait;
use http::{header::CONTENT_TYPE, HeaderName, HeaderValue, StatusCode};
use hyper::{body::Bytes, Request, Response};
use serde::Serialize;
use std::{str::FromStr, sync::Arc};
use thiserror::Error;

/// Set on best-effort responses to requests that did not match any interaction.
pub const MISMATCH_HEADER: &str = "x-pactmock-mismatch";

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot serialize response body: {0}")]
    ResponseBodySerializeError(serde_json::Error),
    #[error("cannot convert response body: {0}")]
    ResponseBodyConversionError(http::Error),
    #[error("invalid status code: {0}")]
    InvalidStatusCode(#[from] http::status::InvalidStatusCode),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

#[async_trait]
pub(crate) trait Handler {
    async fn handle(&self, req: Request<Bytes>) -> Result<Response<Bytes>, Error>;
}

/// Answers every request with the outcome of matching it against the session's interactions.
pub(crate) struct PactHandler<R>
where
    R: Registry + Send + Sync + 'static,
{
    registry: Arc<R>,
}

#[async_trait]
impl<R> Handler for PactHandler<R>
where
    R: Registry + Send + Sync + 'static,
{
    async fn handle(&self, req: Request<Bytes>) -> Result<Response<Bytes>, Error> {
        tracing::trace!("Matching incoming request: {:?}", req);

        let observed = ObservedRequest::from(&req);

        match self.registry.serve(&observed) {
            ServeOutcome::Matched { response, .. } => to_response(&response, None),
            ServeOutcome::BestEffort {
                response, reason, ..
            } => to_response(&response, Some(&reason)),
            ServeOutcome::AlreadySatisfied { index, response } => to_response(
                &response,
                Some(&format!("interaction #{} already satisfied", index + 1)),
            ),
            ServeOutcome::Unmatched { reason } => {
                json_response(StatusCode::INTERNAL_SERVER_ERROR, &ErrorResponse::new(&reason))
            }
        }
    }
}

impl<R> PactHandler<R>
where
    R: Registry + Send + Sync + 'static,
{
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }
}

fn to_response(
    expected: &ExpectedResponse,
    mismatch: Option<&str>,
) -> Result<Response<Bytes>, Error> {
    let mut builder = Response::builder().status(StatusCode::from_u16(expected.status)?);

    let mut has_content_type = false;
    for (key, value) in &expected.headers {
        let name = HeaderName::from_str(key)
            .map_err(|err| InvalidHeader(format!("invalid header key: {}", err)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| InvalidHeader(format!("invalid header value: {}", err)))?;

        has_content_type |= name == CONTENT_TYPE;
        builder = builder.header(name, value);
    }

    if let Some(reason) = mismatch {
        let value = HeaderValue::from_str(reason)
            .map_err(|err| InvalidHeader(format!("invalid header value: {}", err)))?;
        builder = builder.header(MISMATCH_HEADER, value);
    }

    let body = match &expected.body {
        Some(body) => {
            if !has_content_type {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            Bytes::from(serde_json::to_vec(body).map_err(ResponseBodySerializeError)?)
        }
        None => Bytes::new(),
    };

    builder.body(body).map_err(ResponseBodyConversionError)
}

fn json_response<T>(status: StatusCode, body: &T) -> Result<Response<Bytes>, Error>
where
    T: Serialize,
{
    let body_bytes = serde_json::to_vec(body).map_err(ResponseBodySerializeError)?;

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Bytes::from(body_bytes))
        .map_err(ResponseBodyConversionError)
}
