use pactmock::{prelude::*, MismatchField, MISMATCH_HEADER};

fn session_expecting_query(query: &str) -> PactSession {
    PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .given("something given")
        .upon_receiving("upon receiving stuff")
        .with(ExpectedRequest::new(GET, "/api/test/something").query(query))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(200))
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn different_query_fails_verification_test() {
    // Arrange
    let session = session_expecting_query("a=b");

    // Act
    let response = session.client().get("/api/test/something?a=c").unwrap();

    // Assert: best-effort reply with the configured status
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()[MISMATCH_HEADER], "query mismatch");

    let err = session.verify().unwrap_err();
    let report = err.report().unwrap();
    let mismatch = &report.failures[0].mismatches[0];
    assert_eq!(mismatch.field, MismatchField::Query);
    assert_eq!(mismatch.expected, "a=b");
    assert_eq!(mismatch.actual, "a=c");
}

#[test]
fn query_can_contain_multiple_segments_test() {
    // Arrange
    let session = session_expecting_query("a=b&test=quest");

    // Act
    let response = session
        .client()
        .get("/api/test/something?a=b&test=quest")
        .unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    assert!(response.headers().get(MISMATCH_HEADER).is_none());
    session.verify().unwrap();
}

#[test]
fn query_segment_order_is_ignored_test() {
    // Arrange
    let session = session_expecting_query("a=b&test=quest");

    // Act
    let response = session
        .client()
        .request(GET, "/api/test/something")
        .query("test", "quest")
        .query("a", "b")
        .send()
        .unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    session.verify().unwrap();
}

#[test]
fn missing_query_segment_fails_verification_test() {
    // Arrange
    let session = session_expecting_query("a=b&test=quest");

    // Act
    session.client().get("/api/test/something?a=b").unwrap();

    // Assert
    assert!(session.verify().is_err());
}

#[test]
fn undeclared_query_matches_any_query_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(ExpectedRequest::new(GET, "/search"))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(200))
        .unwrap()
        .build()
        .unwrap();

    // Act
    let response = session.client().get("/search?word=hello").unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    session.verify().unwrap();
}

#[test]
fn url_encoded_query_values_are_decoded_test() {
    // Arrange
    let session = session_expecting_query("name=J%C3%BCrgen+M");

    // Act
    let response = session
        .client()
        .request(GET, "/api/test/something")
        .query("name", "Jürgen M")
        .send()
        .unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    session.verify().unwrap();
}
