//! Tests against a real listener, driven over HTTP with `reqwest`.
//!
//! The server binds an ephemeral port on 127.0.0.1 and runs in a background
//! task for the lifetime of the test.
//!
//! Run with: `cargo test --test server_tests`
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;
use user_api::{AppState, Config, LogRecord, MemorySink, build_router};

struct TestServer {
    base_url: String,
    client: Client,
    sink: Arc<MemorySink>,
}

impl TestServer {
    async fn start() -> Self {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "warn".to_string(),
            ..Config::default()
        };
        let sink = Arc::new(MemorySink::default());
        let app = build_router(AppState::with_log_sink(config, sink.clone()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind server");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{addr}"),
            client,
            sink,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Records are emitted once the response body has been written, which
    /// can land just after the client has read it.
    async fn wait_for_records(&self, count: usize) -> Vec<LogRecord> {
        for _ in 0..100 {
            let records = self.sink.records();
            if records.len() >= count {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} log records, got {}", self.sink.records().len());
    }
}

#[tokio::test]
async fn test_health_over_http() {
    let server = TestServer::start().await;

    let response = server.client.get(server.url("/api/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_basic_auth_over_http() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/api/users"))
        .basic_auth("admin", Some("secret123"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let users: Value = response.json().await.unwrap();
    assert_eq!(users.as_array().unwrap().len(), 2);

    let response = server
        .client
        .get(server.url("/api/users"))
        .basic_auth("admin", Some("wrong"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_record_emitted_after_body_sent() {
    let server = TestServer::start().await;

    let response = server
        .client
        .post(server.url("/api/users?password=pw"))
        .header("cookie", "session=abc")
        .json(&serde_json::json!({ "name": "Ada", "token": "t0ken" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();

    let records = server.wait_for_records(1).await;
    let record = &records[0];
    assert_eq!(record.status_code, 201);
    assert_eq!(record.request.headers["cookie"], "[REDACTED]");
    assert_eq!(record.request.query["password"], "[REDACTED]");
    assert!(!record.request.body.as_deref().unwrap().contains("t0ken"));

    let logged: Value = serde_json::from_str(record.response.body.as_deref().unwrap()).unwrap();
    assert_eq!(logged, created);
}
