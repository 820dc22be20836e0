use pactmock::{prelude::*, MismatchField, MISMATCH_HEADER};
use serde_json::json;

#[test]
fn post_with_different_body_fails_verification_test() {
    // Arrange
    let (client, verification) = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(
            ExpectedRequest::new(POST, "/api/test/something")
                .json_body(json!({ "SomeProperty": "test" })),
        )
        .unwrap()
        .will_respond_with(ExpectedResponse::new(201))
        .unwrap()
        .client()
        .unwrap();

    // Act
    let response = client
        .post_json("/api/test/something", &json!({ "SomeOtherProperty": "test" }))
        .unwrap();

    // Assert: the client still gets an answer, verification fails afterwards
    assert_eq!(response.status(), 201);
    assert_eq!(response.headers()[MISMATCH_HEADER], "body mismatch");

    let err = verification.verify().unwrap_err();
    let report = err.report().expect("expected a verification report");
    assert_eq!(report.failures.len(), 1);
    assert!(!report.failures[0].matched);
    assert_eq!(report.failures[0].mismatches[0].field, MismatchField::Body);
    assert!(err.to_string().contains("SomeOtherProperty"));
}

#[test]
fn body_key_order_and_whitespace_are_ignored_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(
            ExpectedRequest::new(POST, "/users")
                .json_body(json!({ "name": "Fred", "tags": ["a", "b"], "age": 42 })),
        )
        .unwrap()
        .will_respond_with(ExpectedResponse::new(201))
        .unwrap()
        .build()
        .unwrap();

    // Act
    let response = session
        .client()
        .request(POST, "/users")
        .header("Content-Type", "application/json")
        .body("{\n  \"age\": 42.0,\n  \"tags\": [\"a\", \"b\"],\n  \"name\": \"Fred\"\n}")
        .send()
        .unwrap();

    // Assert
    assert_eq!(response.status(), 201);
    session.verify().unwrap();
}

#[test]
fn reordered_array_does_not_match_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(ExpectedRequest::new(POST, "/numbers").json_body(json!([1, 2, 3])))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(201))
        .unwrap()
        .build()
        .unwrap();

    // Act
    session
        .client()
        .post_json("/numbers", &json!([3, 2, 1]))
        .unwrap();

    // Assert
    assert!(session.verify().is_err());
    assert!(!session.interactions()[0].mismatches().is_empty());
}

#[test]
fn missing_body_fails_verification_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(ExpectedRequest::new(POST, "/users").json_body(json!({ "name": "Fred" })))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(201))
        .unwrap()
        .build()
        .unwrap();

    // Act
    let response = session.client().request(POST, "/users").send().unwrap();

    // Assert
    assert_eq!(response.status(), 201);
    let interactions = session.interactions();
    assert_eq!(interactions[0].mismatches()[0].actual, "<no body>");
    assert!(session.verify().is_err());
}

#[test]
fn response_body_is_compact_json_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(ExpectedRequest::new(GET, "/users/1"))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(200).json_body(json!({ "name": "Hans" })))
        .unwrap()
        .build()
        .unwrap();

    // Act
    let response = session.client().get("/users/1").unwrap();

    // Assert
    assert_eq!(response.body().as_ref(), br#"{"name":"Hans"}"#);
    session.verify().unwrap();
}
