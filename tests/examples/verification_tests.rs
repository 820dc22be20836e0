use pactmock::{prelude::*, UnexpectedReason, MISMATCH_HEADER};
use serde_json::{json, Value};

fn single_interaction_session() -> PactSession {
    PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .given("something given")
        .upon_receiving("upon receiving stuff")
        .with(
            ExpectedRequest::new(GET, "/api/test/something")
                .query("a=b")
                .header("Authorization", "Bearer accesstoken")
                .json_body(json!({ "SomeProperty": "test" })),
        )
        .unwrap()
        .will_respond_with(
            ExpectedResponse::new(200)
                .header("Content-Type", "application/json; charset=utf-8")
                .json_body(json!({ "SomeProperty": "test" })),
        )
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn build_does_not_fail_test() {
    let session = single_interaction_session();

    assert_eq!(session.consumer(), "Me");
    assert_eq!(session.provider(), "Someone");
    assert!(session.address().ip().is_loopback());
}

#[test]
fn verify_without_traffic_fails_test() {
    // Arrange
    let session = single_interaction_session();

    // Act
    let err = session.verify().unwrap_err();

    // Assert
    let report = err.report().unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].mismatches.is_empty());
    assert_eq!(
        report.failures[0].description.as_deref(),
        Some("upon receiving stuff")
    );
    assert!(err.to_string().contains("never invoked"));
}

#[test]
fn verification_can_be_repeated_test() {
    // Arrange
    let session = single_interaction_session();
    let verification = session.verification_handle();

    // Act + Assert
    assert!(verification.verify().is_err());
    assert!(verification.verify().is_err());
    assert!(!verification.report().is_success());
}

#[test]
#[should_panic(expected = "Pact verification failed for consumer 'Me' and provider 'Someone'")]
fn assert_panics_on_failure_test() {
    let session = single_interaction_session();
    session.assert();
}

#[test]
fn unknown_request_gets_error_response_test() {
    // Arrange
    let session = single_interaction_session();

    // Act
    let response = session.client().get("/somewhere/else").unwrap();

    // Assert
    assert_eq!(response.status(), 500);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("GET /somewhere/else"));

    let unexpected = session.unexpected_requests();
    assert_eq!(unexpected.len(), 1);
    assert_eq!(unexpected[0].reason, UnexpectedReason::NoInteraction);
    assert!(session.verify().is_err());
}

#[test]
fn second_identical_request_is_unexpected_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(ExpectedRequest::new(GET, "/once"))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(200))
        .unwrap()
        .build()
        .unwrap();
    let client = session.client();

    // Act
    let first = client.get("/once").unwrap();
    let second = client.get("/once").unwrap();

    // Assert
    assert!(first.headers().get(MISMATCH_HEADER).is_none());
    assert_eq!(second.status(), 200);
    assert_eq!(
        second.headers()[MISMATCH_HEADER],
        "interaction #1 already satisfied"
    );
    assert_eq!(
        session.unexpected_requests()[0].reason,
        UnexpectedReason::AlreadySatisfied { interaction: 0 }
    );

    let err = session.verify().unwrap_err();
    let report = err.report().unwrap();
    assert!(report.failures.is_empty());
    assert_eq!(report.unexpected.len(), 1);
}

#[test]
fn duplicate_interactions_are_claimed_in_order_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .upon_receiving("first poll")
        .with(ExpectedRequest::new(GET, "/status"))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(200).json_body(json!({ "state": "pending" })))
        .unwrap()
        .upon_receiving("second poll")
        .with(ExpectedRequest::new(GET, "/status"))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(200).json_body(json!({ "state": "done" })))
        .unwrap()
        .build()
        .unwrap();
    let client = session.client();

    // Act
    let first: Value = serde_json::from_slice(client.get("/status").unwrap().body()).unwrap();
    let second: Value = serde_json::from_slice(client.get("/status").unwrap().body()).unwrap();

    // Assert
    assert_eq!(first["state"], "pending");
    assert_eq!(second["state"], "done");
    session.verify().unwrap();
}

#[test]
fn verification_handle_outlives_session_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(ExpectedRequest::new(GET, "/ping"))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(204))
        .unwrap()
        .build()
        .unwrap();
    let client = session.client();
    let verification = session.verification_handle();

    // Act
    drop(session);
    let response = client.get("/ping").unwrap();

    // Assert
    assert_eq!(response.status(), 204);
    verification.verify().unwrap();
}

#[test]
fn non_ascii_path_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(ExpectedRequest::new(GET, "/users/jürgen"))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(200))
        .unwrap()
        .build()
        .unwrap();

    // Act
    let response = session.client().get("/users/jürgen").unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    assert_eq!(session.received_requests()[0].path(), "/users/jürgen");
    session.verify().unwrap();
}
