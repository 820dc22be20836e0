use crate::common::{
    data::{ExpectedRequest, MismatchDetail, MismatchField, ObservedRequest},
    util::{decode_path, normalize_path},
};
use crate::server::matchers::Matcher;

/// Compares normalized, percent-decoded paths. Expected paths already carry the configured base
/// path, which is applied when an interaction is registered.
pub(crate) struct PathMatcher {}

impl PathMatcher {
    pub fn new() -> Self {
        Self {}
    }
}

impl Matcher for PathMatcher {
    fn matches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> bool {
        normalize_path(req.path()) == normalize_path(&decode_path(&expected.path))
    }

    fn mismatches(&self, req: &ObservedRequest, expected: &ExpectedRequest) -> Vec<MismatchDetail> {
        match self.matches(req, expected) {
            true => Vec::new(),
            false => vec![MismatchDetail::new(
                MismatchField::Path,
                expected.path.as_str(),
                req.path(),
            )],
        }
    }

    fn disqualifies(&self) -> bool {
        true
    }
}
