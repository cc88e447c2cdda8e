//! Real-socket tests: startup, requests over TCP, graceful shutdown.

mod common;

use std::time::Duration;

use serde_json::{json, Value};

use common::{spawn_app, test_config};

#[tokio::test]
async fn test_serves_over_tcp() {
    let app = spawn_app(test_config()).await;
    let client = reqwest::Client::new();

    let response = client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let response = client
        .post(app.url("/api/notes"))
        .json(&json!({ "title": "Over the wire" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: Value = client
        .get(app.url("/api/notes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["pagination"]["total"], 1);

    app.shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let app = spawn_app(test_config()).await;

    app.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), app.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_bind_failure() {
    let first = spawn_app(test_config()).await;

    let mut config = test_config();
    config.collector.enabled = false;
    config.server.bind_address = first.addr.to_string();
    let err = api_starter::Application::build(config).await.err().unwrap();
    assert!(err.to_string().starts_with("Failed to bind"));

    first.shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_collector_endpoint_fails_startup() {
    let mut config = test_config();
    config.collector.endpoint = Some("not a url".to_string());

    let result = api_starter::Application::build(config).await;
    assert!(matches!(
        result,
        Err(api_starter::lifecycle::StartupError::Collector(_))
    ));
}
