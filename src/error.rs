use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

/// Application-wide error types with appropriate HTTP status codes.
///
/// Client-facing errors (`BadRequest`, `NotFound`, `PayloadTooLarge`) carry a
/// message that is safe to show as-is. Everything else is reported to the
/// client with a generic message and logged in full server-side.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients. Never contains internal details.
    pub fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) | AppError::PayloadTooLarge(msg) => {
                msg.clone()
            }
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::ConfigError(_) => "Service configuration error".to_string(),
        }
    }
}

/// Marker left in response extensions for the exception filter.
///
/// The filter uses it to rebuild the body with request path and method,
/// which are not available from inside `IntoResponse`.
#[derive(Debug, Clone)]
pub struct HandledError {
    pub status: StatusCode,
    pub message: String,
    /// Full internal error text, for server-side logs only.
    pub detail: String,
}

/// Error document returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            path: None,
            method: None,
            message: message.into(),
            details: None,
            status_code: status.as_u16(),
        }
    }

    pub fn with_request(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.path = Some(path.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.client_message();

        let mut response =
            (status, axum::Json(ErrorResponse::new(status, message.clone()))).into_response();
        response.extensions_mut().insert(HandledError {
            status,
            message,
            detail: self.to_string(),
        });
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => AppError::BadRequest(sanitize_body_error(&e.body_text())),
            JsonRejection::JsonSyntaxError(_) => {
                AppError::BadRequest("Malformed JSON in request body".to_string())
            }
            JsonRejection::MissingJsonContentType(_) => AppError::BadRequest(
                "Expected request with `Content-Type: application/json`".to_string(),
            ),
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(sanitize_body_error(&rejection.body_text()))
    }
}

/// Sanitize deserializer error text to avoid leaking internal type information.
///
/// Serde messages name Rust structs and types. Only the field name is kept.
fn sanitize_body_error(msg: &str) -> String {
    if msg.contains("missing field")
        && let Some(field) = backticked(msg)
    {
        return format!("Missing required field: {field}");
    }

    if msg.contains("unknown field")
        && let Some(field) = backticked(msg)
    {
        return format!("Unknown field: {field}");
    }

    if msg.contains("invalid type") || msg.contains("invalid digit") {
        return "Invalid data type in request".to_string();
    }

    "Invalid request format".to_string()
}

fn backticked(msg: &str) -> Option<&str> {
    let (_, rest) = msg.split_once('`')?;
    let (field, _) = rest.split_once('`')?;
    Some(field)
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
