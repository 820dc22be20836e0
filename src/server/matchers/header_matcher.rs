use crate::common::data::{ExpectedRequest, MismatchDetail, MismatchField, ObservedRequest};
use crate::server::matchers::Matcher;

/// Subset match: every declared header must be present with an equal value, any other header
/// of the request is ignored. Names are compared case-insensitively, values exactly.
pub(crate) struct HeaderMatcher {}

impl HeaderMatcher {
    pub fn new() -> Self {
        Self {}
    }

    fn get_unmatched<'a>(
        &self,
        req: &ObservedRequest,
        expected: &'a ExpectedRequest,
    ) -> Vec<(&'a String, &'a String)> {
        expected
            .headers
            .iter()
            .filter(|(name, value)| !header_present(req, name, value))
            .map(|(name, value)| (name, value))
            .collect()
    }
}

fn header_present(req: &ObservedRequest, name: &str, value: &str) -> bool {
    let values: Vec<&str> = req.header_values(name).collect();
    values.iter().any(|v| *v == value) || (values.len() > 1 && values.join(", ") == value)
}

impl Matcher for HeaderMatcher {
    fn matches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> bool {
        self.get_unmatched(req, expected).is_empty()
    }

    fn mismatches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> Vec<MismatchDetail> {
        self.get_unmatched(req, expected)
            .into_iter()
            .map(|(name, value)| {
                let actual: Vec<&str> = req.header_values(name).collect();
                let actual = match actual.is_empty() {
                    true => "<absent>".to_string(),
                    false => format!("{}: {}", name, actual.join(", ")),
                };

                MismatchDetail::new(MismatchField::Header, format!("{}: {}", name, value), actual)
            })
            .collect()
    }
}
