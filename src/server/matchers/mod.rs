use crate::common::data::{ExpectedRequest, MismatchDetail, ObservedRequest};

pub(crate) mod body_matcher;
pub(crate) mod header_matcher;
pub(crate) mod method_matcher;
pub(crate) mod path_matcher;
pub(crate) mod query_matcher;

use body_matcher::BodyMatcher;
use header_matcher::HeaderMatcher;
use method_matcher::MethodMatcher;
use path_matcher::PathMatcher;
use query_matcher::QueryMatcher;

/// Compares one attribute of a received request with the expected request of an interaction.
pub(crate) trait Matcher {
    fn matches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> bool;
    fn mismatches(&self, req: &ObservedRequest, expected: &ExpectedRequest)
        -> Vec<MismatchDetail>;

    /// If a request fails this check, the interaction is not a candidate for the request at all.
    fn disqualifies(&self) -> bool {
        false
    }
}

pub(crate) fn all() -> Vec<Box<dyn Matcher + Sync + Send>> {
    vec![
        Box::new(MethodMatcher::new()),
        Box::new(PathMatcher::new()),
        Box::new(QueryMatcher::new()),
        Box::new(HeaderMatcher::new()),
        Box::new(BodyMatcher::new()),
    ]
}

pub(crate) fn request_matches(
    matchers: &[Box<dyn Matcher + Sync + Send>],
    req: &ObservedRequest,
    expected: &ExpectedRequest,
) -> bool {
    matchers.iter().all(|m| m.matches(req, expected))
}

/// The result of running every matcher against one interaction.
#[derive(Debug)]
pub(crate) struct Evaluation {
    pub passed: usize,
    pub disqualified: bool,
    pub mismatches: Vec<MismatchDetail>,
}

pub(crate) fn evaluate(
    matchers: &[Box<dyn Matcher + Sync + Send>],
    req: &ObservedRequest,
    expected: &ExpectedRequest,
) -> Evaluation {
    let mut evaluation = Evaluation {
        passed: 0,
        disqualified: false,
        mismatches: Vec::new(),
    };

    for matcher in matchers {
        let mismatches = matcher.mismatches(req, expected);
        if mismatches.is_empty() {
            evaluation.passed += 1;
            continue;
        }

        evaluation.disqualified |= matcher.disqualifies();
        evaluation.mismatches.extend(mismatches);
    }

    evaluation
}
