use pactmock::{prelude::*, MismatchField};

#[test]
fn multiple_request_headers_test() {
    // Arrange
    let (mut client, verification) = PactBuilder::with_config(PactConfig::new().base_path("/api"))
        .service_consumer("Me")
        .has_pact_with("Someone")
        .given("something given")
        .upon_receiving("upon receiving stuff")
        .with(
            ExpectedRequest::new(GET, "/api/test/something")
                .query("a=b")
                .header("Accept", "application/json")
                .header("Authorization", "Bearer accesstoken"),
        )
        .unwrap()
        .will_respond_with(
            ExpectedResponse::new(200)
                .header("Content-Type", "application/json; charset=utf-8"),
        )
        .unwrap()
        .client()
        .unwrap();

    client.set_bearer_token("accesstoken");

    // Act
    let response = client
        .request(GET, "test/something?a=b")
        .header("Accept", "application/json")
        .header("X-Request-Id", "42")
        .send()
        .unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    verification.verify().unwrap();
}

#[test]
fn header_names_are_case_insensitive_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(ExpectedRequest::new(GET, "/").header("X-API-KEY", "secret"))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(200))
        .unwrap()
        .build()
        .unwrap();

    // Act
    session
        .client()
        .request(GET, "/")
        .header("x-api-key", "secret")
        .send()
        .unwrap();

    // Assert
    session.verify().unwrap();
}

#[test]
fn missing_header_fails_verification_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(
            ExpectedRequest::new(GET, "/api/test/something")
                .header("Authorization", "Bearer accesstoken"),
        )
        .unwrap()
        .will_respond_with(ExpectedResponse::new(200))
        .unwrap()
        .build()
        .unwrap();

    // Act
    session.client().get("/api/test/something").unwrap();

    // Assert
    let err = session.verify().unwrap_err();
    let mismatch = &err.report().unwrap().failures[0].mismatches[0];
    assert_eq!(mismatch.field, MismatchField::Header);
    assert_eq!(mismatch.expected, "Authorization: Bearer accesstoken");
    assert_eq!(mismatch.actual, "<absent>");
}

#[test]
fn response_headers_are_sent_verbatim_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(ExpectedRequest::new(GET, "/download"))
        .unwrap()
        .will_respond_with(
            ExpectedResponse::new(200)
                .header("Content-Type", "text/plain")
                .header("X-Rate-Limit", "100"),
        )
        .unwrap()
        .build()
        .unwrap();

    // Act
    let response = session.client().get("/download").unwrap();

    // Assert
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert_eq!(response.headers()["x-rate-limit"], "100");
    session.verify().unwrap();
}
