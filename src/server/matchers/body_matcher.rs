use crate::common::data::{ExpectedRequest, MismatchDetail, MismatchField, ObservedRequest};
use crate::server::matchers::Matcher;
use assert_json_diff::{assert_json_matches_no_panic, CompareMode, Config};
use serde_json::{Number, Value};

const NO_BODY: &str = "<no body>";

/// Compares the request body with the declared body by structure rather than by text:
/// object key order and whitespace are insignificant.
pub(crate) struct BodyMatcher {}

impl BodyMatcher {
    pub fn new() -> Self {
        Self {}
    }
}

impl Matcher for BodyMatcher {
    fn matches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> bool {
        expected.body.as_ref().map_or(true, |expected_body| {
            req.body_value()
                .map_or(false, |actual| structurally_equal(expected_body, &actual))
        })
    }

    fn mismatches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> Vec<MismatchDetail> {
        let expected_body = match &expected.body {
            None => return Vec::new(),
            Some(body) => body,
        };

        match req.body_value() {
            None => vec![MismatchDetail::new(
                MismatchField::Body,
                expected_body.to_string(),
                NO_BODY,
            )],
            Some(actual) if !structurally_equal(expected_body, &actual) => {
                let detail =
                    assert_json_matches_no_panic(&actual, expected_body, Config::new(CompareMode::Strict)).err();
                vec![
                    MismatchDetail::new(MismatchField::Body, expected_body.to_string(), actual.to_string())
                        .with_detail(detail),
                ]
            }
            Some(_) => Vec::new(),
        }
    }
}

/// Deep structural equality. Objects are compared as unordered sets of named fields, arrays
/// element by element and numbers by value (so `1` equals `1.0`).
pub(crate) fn structurally_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(e), Value::Object(a)) => {
            e.len() == a.len()
                && e.iter().all(|(key, ev)| {
                    a.get(key)
                        .map_or(false, |av| structurally_equal(ev, av))
                })
        }
        (Value::Array(e), Value::Array(a)) => {
            e.len() == a.len() && e.iter().zip(a).all(|(ev, av)| structurally_equal(ev, av))
        }
        (Value::Number(e), Value::Number(a)) => numbers_equal(e, a),
        (e, a) => e == a,
    }
}

fn numbers_equal(e: &Number, a: &Number) -> bool {
    if let (Some(x), Some(y)) = (e.as_i64(), a.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (e.as_u64(), a.as_u64()) {
        return x == y;
    }
    match (e.as_f64(), a.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
