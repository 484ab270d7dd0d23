//! Shared helpers for router-level tests.
#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tower::ServiceExt;
use user_api::{AppState, Config, MemorySink, build_router};

pub struct TestApp {
    pub router: Router,
    pub sink: Arc<MemorySink>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let sink = Arc::new(MemorySink::default());
        let state = AppState::with_log_sink(config, sink.clone());
        Self {
            router: build_router(state),
            sink,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (Response<Body>, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        (Response::from_parts(parts, Body::empty()), bytes.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let (response, bytes) = self
            .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        (response.status(), serde_json::from_slice(&bytes).unwrap())
    }
}

pub fn basic_header(user: &str, pass: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
}

pub fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
