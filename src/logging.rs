//! Log records, sinks, and subscriber setup.
//!
//! The API logger builds one [`LogRecord`] per request and hands it to a
//! [`LogSink`]. The sink is an explicit dependency of the router so tests
//! (or embedders) can swap the default [`TracingSink`] for a
//! [`MemorySink`] without touching global state.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Severity of a request log record, derived from the response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `>= 500` is an error, `>= 400` a warning, anything else info.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            500.. => LogLevel::Error,
            400..=499 => LogLevel::Warn,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        })
    }
}

/// Redacted view of the inbound request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestLog {
    pub headers: Map<String, Value>,
    pub query: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// One record per completed request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub timestamp: String,
    pub level: LogLevel,
    pub request_id: String,
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub duration_ms: u64,
    pub request: RequestLog,
    pub response: ResponseLog,
}

#[derive(Error, Debug)]
pub enum LogSinkError {
    #[error("Failed to serialize log record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Log sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for request log records.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &LogRecord) -> Result<(), LogSinkError>;
}

/// Emits records through `tracing` at the record's level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &LogRecord) -> Result<(), LogSinkError> {
        let json = serde_json::to_string(record)?;
        let status = record.status_code;

        match record.level {
            LogLevel::Error => error!(target: "api", request_id = %record.request_id, record = %json, "HTTP {status}"),
            LogLevel::Warn => warn!(target: "api", request_id = %record.request_id, record = %json, "HTTP {status}"),
            LogLevel::Info => info!(target: "api", request_id = %record.request_id, record = %json, "HTTP {status}"),
        }
        Ok(())
    }
}

/// Keeps the most recent records in memory.
#[derive(Debug)]
pub struct MemorySink {
    records: Mutex<VecDeque<LogRecord>>,
    capacity: usize,
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Snapshot of the retained records, oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &LogRecord) -> Result<(), LogSinkError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| LogSinkError::Unavailable(e.to_string()))?;
        if records.len() == self.capacity {
            records.pop_front();
        }
        if self.capacity > 0 {
            records.push_back(record.clone());
        }
        Ok(())
    }
}

/// Install the global `tracing` subscriber.
///
/// Production emits JSON lines; development uses the human-readable format.
/// `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    }
}
