use crate::common::data::{ExpectedRequest, MismatchDetail, MismatchField, ObservedRequest};
use crate::server::matchers::Matcher;

pub(crate) struct MethodMatcher {}

impl MethodMatcher {
    pub fn new() -> Self {
        Self {}
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> bool {
        req.method().eq_ignore_ascii_case(expected.method.as_str())
    }

    fn mismatches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> Vec<MismatchDetail> {
        match self.matches(req, expected) {
            true => Vec::new(),
            false => vec![MismatchDetail::new(
                MismatchField::Method,
                expected.method.as_str(),
                req.method(),
            )],
        }
    }
}
