use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
}

/// Query parameters for `GET /api/users/search`.
#[derive(Debug, Deserialize)]
pub struct SearchUsersQuery {
    pub id: i64,
    pub age: Option<u32>,
    pub active: Option<bool>,
}

/// Status envelope used by the search and authentication-failure responses.
///
/// The `statuscode` field mirrors the HTTP status the caller should expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: String,
    pub statuscode: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl StatusPayload {
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            status: "success".to_string(),
            statuscode: 200,
            message: None,
            data: Some(data),
        }
    }

    pub fn failed(statuscode: u16, message: impl Into<String>) -> Self {
        Self {
            status: "failed".to_string(),
            statuscode,
            message: Some(message.into()),
            data: None,
        }
    }
}
