//! `pactmock` lets a test suite pin down the HTTP contract between a consumer (the code under
//! test) and a provider (the remote service it talks to) without running the provider.
//!
//! A test declares the interactions it expects, i.e. pairs of an expected request and the
//! response the provider would send. `pactmock` then starts an in-process **mock endpoint** on
//! a loopback port that answers requests matching those interactions. After the test has
//! exercised the consumer, **verification** checks that every declared interaction actually
//! happened and that no unexpected or mismatching request was received.
//!
//! # Getting Started
//! ```rust
//! use pactmock::prelude::*;
//! use serde_json::{json, Value};
//!
//! // Declare the pact and start the mock endpoint.
//! let (client, verification) = PactBuilder::new()
//!     .service_consumer("Me")
//!     .has_pact_with("Someone")
//!     .given("a user named Fred exists")
//!     .upon_receiving("a request to create a user")
//!     .with(ExpectedRequest::new(POST, "/api/users").json_body(json!({ "name": "Fred" })))
//!     .unwrap()
//!     .will_respond_with(ExpectedResponse::new(201).json_body(json!({ "id": 1 })))
//!     .unwrap()
//!     .client()
//!     .unwrap();
//!
//! // Exercise the consumer. Usually this is your own API client pointed at `client.base_url()`.
//! let response = client.post_json("/api/users", &json!({ "name": "Fred" })).unwrap();
//! let body: Value = serde_json::from_slice(response.body()).unwrap();
//!
//! assert_eq!(response.status(), 201);
//! assert_eq!(body, json!({ "id": 1 }));
//!
//! // Check that every declared interaction happened.
//! verification.verify().unwrap();
//! ```
//!
//! # Matching
//! A received request matches an interaction if
//! * the method is equal,
//! * the path is equal (after normalizing leading and trailing slashes, percent-decoding and
//!   applying the configured base path),
//! * the query, if one was declared, contains the same key/value pairs in any order,
//! * every declared header is present with an equal value (undeclared headers are ignored),
//! * the body, if one was declared, is structurally equal to the expected JSON value
//!   (object key order and whitespace are insignificant).
//!
//! Body equality is exact at every level: a received object must have the same set of keys as
//! the declared one, so additional keys are a mismatch just like missing ones. Arrays compare
//! element by element in order and numbers compare by value (`1` equals `1.0`).
//!
//! Each interaction is claimed by at most one request. If interactions are declared more than
//! once, the first unclaimed one wins.
//!
//! A request that does not match is not an error while the test runs: the mock endpoint answers
//! with the response of the closest candidate (marked with the
//! [`x-pactmock-mismatch`](MISMATCH_HEADER) header) or, if there is none, with status 500. The
//! mismatch is recorded and reported by verification.
//!
//! # Verification
//! [VerificationHandle::verify] returns [Error::ExpectationViolation] with a
//! [VerificationReport] when an interaction was never invoked, a request mismatched or a
//! request arrived that no interaction expects. The report renders a human-readable
//! explanation including a diff of mismatching bodies:
//! ```rust
//! use pactmock::prelude::*;
//! use serde_json::json;
//!
//! let session = PactBuilder::new()
//!     .service_consumer("Me")
//!     .has_pact_with("Someone")
//!     .with(ExpectedRequest::new(POST, "/api/test/something")
//!         .json_body(json!({ "SomeProperty": "test" })))
//!     .unwrap()
//!     .will_respond_with(ExpectedResponse::new(201))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! session.client()
//!     .post_json("/api/test/something", &json!({ "SomeOtherProperty": "test" }))
//!     .unwrap();
//!
//! let err = session.verify().unwrap_err();
//! assert!(err.to_string().contains("Body mismatch"));
//! ```
//!
//! # Configuration
//! [PactConfig] sets a base path that is prepended to all interaction paths, a static port,
//! an access log and a diagnostic sink that receives a trace line for every matching step.
//! [PactConfig::from_env] reads the settings from `PACTMOCK_BASE_PATH`, `PACTMOCK_PORT` and
//! `PACTMOCK_PRINT_ACCESS_LOG`.
//!
//! # Logging
//! `pactmock` logs through `tracing`. Log records are also emitted through the `log` crate,
//! so any `log` compatible logger (e.g. `env_logger`) shows them.
//!
//! # Features
//! * `color`: colors body diffs in verification reports.
mod api;
mod common;
mod server;

pub use api::{
    client::Error as ClientError, ConsumerStage, InteractionFailure, InteractionStage,
    PactBuilder, PactClient, PactConfig, PactRequestBuilder, PactSession, RequestStage,
    ResponseStage, VerificationHandle, VerificationReport,
};
pub use common::{
    data::{
        ExpectedRequest, ExpectedResponse, Interaction, Method, MismatchDetail, MismatchField,
        ObservedRequest, UnexpectedReason, UnexpectedRequest,
    },
    error::Error,
    util::DiagnosticSink,
};
pub use server::{Error as ServerError, MISMATCH_HEADER};

#[doc(hidden)]
pub use common::util::Join;

pub mod prelude {
    #[doc(no_inline)]
    pub use crate::{
        Error, ExpectedRequest, ExpectedResponse, Method, Method::DELETE, Method::GET,
        Method::HEAD, Method::OPTIONS, Method::PATCH, Method::POST, Method::PUT, PactBuilder,
        PactClient, PactConfig, PactSession, VerificationHandle,
    };
}
