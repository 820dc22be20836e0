mod body_tests;
mod getting_started_tests;
mod headers_tests;
mod query_tests;
mod verification_tests;
