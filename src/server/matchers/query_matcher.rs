use crate::common::{
    data::{ExpectedRequest, MismatchDetail, MismatchField, ObservedRequest},
    util::sorted_query_pairs,
};
use crate::server::matchers::Matcher;

const NO_QUERY: &str = "<no query>";

/// Compares query strings as multisets of key/value pairs. An interaction without a declared
/// query accepts any query.
pub(crate) struct QueryMatcher {}

impl QueryMatcher {
    pub fn new() -> Self {
        Self {}
    }
}

impl Matcher for QueryMatcher {
    fn matches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> bool {
        expected.query.as_ref().map_or(true, |query| {
            sorted_query_pairs(query) == sorted_query_pairs(req.query().unwrap_or(""))
        })
    }

    fn mismatches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> Vec<MismatchDetail> {
        if self.matches(req, expected) {
            return Vec::new();
        }

        let expected_query = expected.query.as_deref().unwrap_or("");
        let expected_text = match expected_query.is_empty() {
            true => NO_QUERY,
            false => expected_query,
        };

        vec![MismatchDetail::new(
            MismatchField::Query,
            expected_text,
            req.query().filter(|q| !q.is_empty()).unwrap_or(NO_QUERY),
        )]
    }
}
