use pactmock::prelude::*;
use serde_json::{json, Value};

#[test]
fn builder_creates_client_test() {
    // Arrange: an interaction with nothing but defaults (GET / -> 200)
    let (client, _verification) = PactBuilder::with_config(PactConfig::new())
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(ExpectedRequest::default())
        .unwrap()
        .will_respond_with(ExpectedResponse::default())
        .unwrap()
        .client()
        .unwrap();

    // Assert
    assert_eq!(client.base_url().scheme(), "http");
    assert_eq!(client.base_url().host_str(), Some("127.0.0.1"));
    assert_eq!(client.base_url().path(), "/");
}

#[test]
fn post_responds_created_test() {
    // Arrange
    let (mut client, verification) = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(
            ExpectedRequest::new(POST, "/api/test/something")
                .header("Authorization", "Bearer accesstoken")
                .json_body(json!({ "SomeProperty": "test" })),
        )
        .unwrap()
        .will_respond_with(
            ExpectedResponse::new(201).header("Content-Type", "application/json"),
        )
        .unwrap()
        .client()
        .unwrap();

    // Act
    client.set_bearer_token("accesstoken");
    let response = client
        .post_json("/api/test/something", &json!({ "SomeProperty": "test" }))
        .unwrap();

    // Assert
    assert_eq!(response.status(), 201);
    assert_eq!(response.headers()["content-type"], "application/json");
    verification.verify().unwrap();
}

#[test]
fn get_responds_with_body_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(
            ExpectedRequest::new(GET, "/api/test/something")
                .header("Authorization", "Bearer accesstoken"),
        )
        .unwrap()
        .will_respond_with(
            ExpectedResponse::new(200)
                .header("Content-Type", "application/json; charset=utf-8")
                .json_body(json!({ "SomeProperty": "test" })),
        )
        .unwrap()
        .build()
        .unwrap();

    let mut client = session.client();
    client.set_bearer_token("accesstoken");

    // Act
    let response = client.get("/api/test/something").unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"],
        "application/json; charset=utf-8"
    );
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["SomeProperty"], "test");

    session.verify().unwrap();
    assert!(session.interactions()[0].matched());
}

#[tokio::test]
async fn async_get_responds_with_body_test() {
    // Arrange
    let (mut client, verification) = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .with(
            ExpectedRequest::new(GET, "/api/test/something")
                .header("Authorization", "Bearer accesstoken"),
        )
        .unwrap()
        .will_respond_with(ExpectedResponse::new(200).json_body(json!({ "SomeProperty": "test" })))
        .unwrap()
        .client()
        .unwrap();

    client.set_bearer_token("accesstoken");

    // Act
    let response = client.get_async("/api/test/something").await.unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body, json!({ "SomeProperty": "test" }));
    verification.verify().unwrap();
}

#[test]
fn multiple_interactions_test() {
    // Arrange
    let session = PactBuilder::new()
        .service_consumer("Me")
        .has_pact_with("Someone")
        .given("a user with id 1 exists")
        .upon_receiving("a request to update the user")
        .with(ExpectedRequest::new(PUT, "/users/1").json_body(json!({ "name": "Hans" })))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(204))
        .unwrap()
        .given("a user with id 1 exists")
        .upon_receiving("a request to rename the user")
        .with(ExpectedRequest::new(PATCH, "/users/1").json_body(json!({ "name": "Fred" })))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(204))
        .unwrap()
        .upon_receiving("a request to delete the user")
        .with(ExpectedRequest::new(DELETE, "/users/1"))
        .unwrap()
        .will_respond_with(ExpectedResponse::new(204))
        .unwrap()
        .build()
        .unwrap();

    let client = session.client();

    // Act: the order of requests does not matter
    let deleted = client.delete("users/1").unwrap();
    let renamed = client.patch_json("users/1", &json!({ "name": "Fred" })).unwrap();
    let updated = client.put_json("users/1", &json!({ "name": "Hans" })).unwrap();

    // Assert
    assert_eq!(deleted.status(), 204);
    assert_eq!(renamed.status(), 204);
    assert_eq!(updated.status(), 204);
    assert!(deleted.body().is_empty());
    session.verify().unwrap();
    assert_eq!(session.received_requests().len(), 3);
}
