use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::openapi;

/// Serve the OpenAPI document.
pub async fn openapi_document() -> Json<Value> {
    Json(openapi::openapi_document())
}

/// Fallback for unmatched paths.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" })))
}
