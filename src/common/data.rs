use crate::{
    common::util::{decode_path, normalize_path},
    Error as PactError,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt::{self, Debug},
    str::FromStr,
};

/// Represents an HTTP method.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::PATCH => "PATCH",
        }
    }
}

impl PartialEq<Method> for http::method::Method {
    fn eq(&self, other: &Method) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}

impl From<Method> for http::method::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::GET => http::Method::GET,
            Method::HEAD => http::Method::HEAD,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
            Method::CONNECT => http::Method::CONNECT,
            Method::OPTIONS => http::Method::OPTIONS,
            Method::TRACE => http::Method::TRACE,
            Method::PATCH => http::Method::PATCH,
        }
    }
}

impl FromStr for Method {
    type Err = PactError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "CONNECT" => Ok(Method::CONNECT),
            "OPTIONS" => Ok(Method::OPTIONS),
            "TRACE" => Ok(Method::TRACE),
            "PATCH" => Ok(Method::PATCH),
            _ => Err(PactError::Construction(format!(
                "unsupported HTTP method {:?}",
                input
            ))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// *************************************************************************************************
// Expectations
// *************************************************************************************************

/// The request a consumer is expected to send to the provider.
///
/// Only the parts that are declared take part in matching: an absent query means "any query",
/// undeclared headers are ignored and an absent body is never compared.
///
/// **Example**:
/// ```
/// use pactmock::prelude::*;
/// use serde_json::json;
///
/// let request = ExpectedRequest::new(POST, "/api/users")
///     .query("dry_run=true")
///     .header("Authorization", "Bearer accesstoken")
///     .json_body(json!({ "name": "Fred" }));
///
/// assert_eq!(request.path, "/api/users");
/// assert_eq!(request.headers.len(), 1);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExpectedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Default for ExpectedRequest {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query: None,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl ExpectedRequest {
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn path<P: Into<String>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the expected query string, e.g. `a=b&test=quest`. Pair order is insignificant.
    pub fn query<Q: Into<String>>(mut self, query: Q) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Declares a header the request must carry. Declaring the same name twice (ignoring case)
    /// replaces the earlier value.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        insert_header(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn json_body<V: Into<Value>>(mut self, body: V) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// The response the mock endpoint sends back once the paired [ExpectedRequest] was matched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExpectedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Default for ExpectedResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl ExpectedResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        insert_header(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn json_body<V: Into<Value>>(mut self, body: V) -> Self {
        self.body = Some(body.into());
        self
    }
}

fn insert_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
    {
        Some(entry) => entry.1 = value,
        None => headers.push((name, value)),
    }
}

// *************************************************************************************************
// Interactions
// *************************************************************************************************

/// One expected request/response pair together with its documentation context and the state
/// the mock endpoint recorded for it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Interaction {
    pub(crate) provider_state: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) request: ExpectedRequest,
    pub(crate) response: ExpectedResponse,
    pub(crate) matched: bool,
    pub(crate) mismatches: Vec<MismatchDetail>,
}

impl Interaction {
    pub(crate) fn new(
        provider_state: Option<String>,
        description: Option<String>,
        request: ExpectedRequest,
        response: ExpectedResponse,
    ) -> Self {
        Self {
            provider_state,
            description,
            request,
            response,
            matched: false,
            mismatches: Vec::new(),
        }
    }

    pub fn provider_state(&self) -> Option<&str> {
        self.provider_state.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn request(&self) -> &ExpectedRequest {
        &self.request
    }

    pub fn response(&self) -> &ExpectedResponse {
        &self.response
    }

    /// Whether a request claimed this interaction. Never reverts once set.
    pub fn matched(&self) -> bool {
        self.matched
    }

    pub fn mismatches(&self) -> &[MismatchDetail] {
        &self.mismatches
    }

    /// A short human-readable label: the description, or method and path if there is none.
    pub fn label(&self) -> String {
        match &self.description {
            Some(description) if !description.is_empty() => description.clone(),
            _ => format!("{} {}", self.request.method, self.request.path),
        }
    }
}

/// The request attribute a [MismatchDetail] refers to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchField {
    Method,
    Path,
    Query,
    Header,
    Body,
}

impl fmt::Display for MismatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MismatchField::Method => "method",
            MismatchField::Path => "path",
            MismatchField::Query => "query",
            MismatchField::Header => "header",
            MismatchField::Body => "body",
        })
    }
}

/// A single failed check of a received request against an interaction's expected request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MismatchDetail {
    pub field: MismatchField,
    pub expected: String,
    pub actual: String,
    pub detail: Option<String>,
}

impl MismatchDetail {
    pub(crate) fn new<E: Into<String>, A: Into<String>>(
        field: MismatchField,
        expected: E,
        actual: A,
    ) -> Self {
        Self {
            field,
            expected: expected.into(),
            actual: actual.into(),
            detail: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }
}

// *************************************************************************************************
// Observed traffic
// *************************************************************************************************

/// A request as it was received by the mock endpoint.
#[derive(Serialize, Deserialize, Clone)]
pub struct ObservedRequest {
    method: String,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl ObservedRequest {
    pub(crate) fn new(
        method: String,
        path: String,
        query: Option<String>,
        headers: Vec<(String, String)>,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            path,
            query,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// All values of the header with the given name, compared case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Interprets the body as a structured value. Empty (or whitespace only) bodies have no
    /// value, bodies that are not valid JSON are returned as a JSON string of their text.
    pub fn body_value(&self) -> Option<Value> {
        if self.body.iter().all(|b| b.is_ascii_whitespace()) {
            return None;
        }

        match serde_json::from_slice(&self.body) {
            Ok(value) => Some(value),
            Err(_) => Some(Value::String(String::from_utf8_lossy(&self.body).to_string())),
        }
    }
}

/// Header values that are not visible ASCII are decoded lossily and the path is
/// percent-decoded, so every received request can be recorded.
impl From<&http::Request<Bytes>> for ObservedRequest {
    fn from(value: &http::Request<Bytes>) -> Self {
        let headers = value
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect();

        // Since Bytes shares data, clone does not copy the body.
        ObservedRequest::new(
            value.method().to_string(),
            normalize_path(&decode_path(value.uri().path())),
            value.uri().query().map(|q| q.to_string()),
            headers,
            value.body().clone(),
        )
    }
}

impl fmt::Display for ObservedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{} {}?{}", self.method, self.path, query),
            None => write!(f, "{} {}", self.method, self.path),
        }
    }
}

/// Prints the body as UTF8 string
impl Debug for ObservedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservedRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("body", &String::from_utf8_lossy(&self.body))
            .finish()
    }
}

/// Why a received request could not be attributed to a pending interaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum UnexpectedReason {
    /// The request fully matched the interaction at this index, but it had already been claimed.
    AlreadySatisfied { interaction: usize },
    /// No pending interaction with this method and path exists.
    NoInteraction,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UnexpectedRequest {
    pub request: ObservedRequest,
    pub reason: UnexpectedReason,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new<T>(message: &T) -> ErrorResponse
    where
        T: ToString,
    {
        ErrorResponse {
            message: message.to_string(),
        }
    }
}
