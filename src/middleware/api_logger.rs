//! Request/response logging middleware.
//!
//! Emits one [`LogRecord`] per request with:
//!
//! - Redacted request headers, query parameters, and top-level body fields
//! - A bounded, truncated copy of the response body
//! - A level derived from the status code (`>= 500` error, `>= 400` warn)
//!
//! # Response Capture
//!
//! The response body is not buffered. It is wrapped in a [`CaptureStream`]
//! that forwards every chunk to the client and copies it into a
//! [`BoundedCapture`]. The record is emitted when the body finishes
//! streaming, or when it is dropped early because the client went away.
//!
//! # Failure Isolation
//!
//! Errors from the [`LogSink`] are logged and swallowed. They never change
//! the response already produced by the handler.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request, Response, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use serde_json::Value;
use tower::{Layer, Service};
use tracing::{error, warn};
use uuid::Uuid;

use super::capture::{BoundedCapture, CaptureStream};
use super::redact::{Redactor, form_to_json, truncate_text};
use crate::error::AppError;
use crate::logging::{LogLevel, LogRecord, LogSink, RequestLog, ResponseLog};

/// Header carrying a caller-supplied correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Redaction lists and capture bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiLoggerOptions {
    /// Header names to redact (case-insensitive)
    pub redact_headers: Vec<String>,
    /// Query parameter names to redact (case-insensitive)
    pub redact_query: Vec<String>,
    /// Top-level JSON/form body fields to redact (case-insensitive)
    pub redact_body_fields: Vec<String>,
    /// Maximum characters of body text kept per record
    pub max_body_length: usize,
    /// Largest inbound body buffered for logging, in bytes
    pub max_request_body_size: usize,
}

impl Default for ApiLoggerOptions {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        Self {
            redact_headers: names(&["authorization", "cookie"]),
            redact_query: names(&["token", "password"]),
            redact_body_fields: names(&["password", "ssn", "token"]),
            max_body_length: 1500,
            max_request_body_size: 100 * 1024,
        }
    }
}

/// Shared logger state.
struct ApiLogger {
    redactor: Redactor,
    max_body_length: usize,
    max_request_body_size: usize,
    sink: Arc<dyn LogSink>,
}

/// Request metadata captured before the handler runs.
struct RequestSnapshot {
    started: Instant,
    request_id: String,
    method: String,
    url: String,
    request: RequestLog,
}

impl ApiLogger {
    fn new(options: &ApiLoggerOptions, sink: Arc<dyn LogSink>) -> Self {
        Self {
            redactor: Redactor::new(
                &options.redact_headers,
                &options.redact_query,
                &options.redact_body_fields,
            ),
            max_body_length: options.max_body_length,
            max_request_body_size: options.max_request_body_size,
            sink,
        }
    }

    fn snapshot(&self, parts: &Parts) -> RequestSnapshot {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        RequestSnapshot {
            started: Instant::now(),
            request_id,
            method: parts.method.to_string(),
            url: self.redactor.url(parts.uri.path(), parts.uri.query()),
            request: RequestLog {
                headers: self.redactor.headers(&parts.headers),
                query: self.redactor.query(parts.uri.query()),
                body: None,
            },
        }
    }

    /// Redacted, truncated text of an inbound body.
    ///
    /// JSON and form bodies are parsed so top-level fields can be redacted.
    /// Bodies of any other type are logged only if they parse as JSON.
    /// Nothing is ever logged raw.
    fn request_body(&self, headers: &HeaderMap, bytes: &Bytes) -> Option<String> {
        if bytes.is_empty() {
            return None;
        }

        let text = match body_kind(headers) {
            BodyKind::Form => serde_json::to_string(&self.redactor.body(form_to_json(bytes))).ok()?,
            BodyKind::Json | BodyKind::Other => {
                let value = serde_json::from_slice::<Value>(bytes).ok()?;
                serde_json::to_string(&self.redactor.body(value)).ok()?
            }
        };

        Some(truncate_text(&text, self.max_body_length))
    }

    /// Wrap the response body so the record is emitted once it has been sent.
    fn tee_response(self: Arc<Self>, snapshot: RequestSnapshot, response: Response<Body>) -> Response<Body> {
        let (parts, body) = response.into_parts();
        let status = parts.status;
        let capture = BoundedCapture::new(self.max_body_length);

        let stream = CaptureStream::new(body.into_data_stream(), capture, move |captured| {
            let elapsed = snapshot.started.elapsed();
            self.emit(snapshot, status, elapsed, captured);
        });

        Response::from_parts(parts, Body::from_stream(stream))
    }

    fn emit(&self, snapshot: RequestSnapshot, status: StatusCode, elapsed: Duration, body: Option<String>) {
        let record = LogRecord {
            timestamp: Utc::now().to_rfc3339(),
            level: LogLevel::from_status(status),
            request_id: snapshot.request_id,
            method: snapshot.method,
            url: snapshot.url,
            status_code: status.as_u16(),
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            request: snapshot.request,
            response: ResponseLog { body },
        };

        if let Err(e) = self.sink.emit(&record) {
            error!(error = %e, request_id = %record.request_id, "Failed to log request");
        }
    }
}

enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let mime = content_type.split(';').next().unwrap_or_default().trim();

    if mime == "application/json" || mime.ends_with("+json") {
        BodyKind::Json
    } else if mime == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

/// API logger layer.
#[derive(Clone)]
pub struct ApiLoggerLayer {
    logger: Arc<ApiLogger>,
}

impl ApiLoggerLayer {
    pub fn new(options: &ApiLoggerOptions, sink: Arc<dyn LogSink>) -> Self {
        Self {
            logger: Arc::new(ApiLogger::new(options, sink)),
        }
    }
}

impl<S> Layer<S> for ApiLoggerLayer {
    type Service = ApiLoggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiLoggerService {
            inner,
            logger: self.logger.clone(),
        }
    }
}

/// API logger service wrapper.
#[derive(Clone)]
pub struct ApiLoggerService<S> {
    inner: S,
    logger: Arc<ApiLogger>,
}

impl<S> Service<Request<Body>> for ApiLoggerService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let logger = self.logger.clone();
        // Use the service that was polled ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let mut snapshot = logger.snapshot(&parts);

            let bytes = match axum::body::to_bytes(body, logger.max_request_body_size).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(
                        error = %e,
                        limit = logger.max_request_body_size,
                        request_id = %snapshot.request_id,
                        "Request body rejected"
                    );
                    let response =
                        AppError::PayloadTooLarge("Request entity too large".to_string()).into_response();
                    return Ok(logger.tee_response(snapshot, response));
                }
            };

            snapshot.request.body = logger.request_body(&parts.headers, &bytes);
            let req = Request::from_parts(parts, Body::from(bytes));

            let response = inner.call(req).await?;
            Ok(logger.tee_response(snapshot, response))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::logging::MemorySink;

    fn logger(max_body_length: usize) -> ApiLogger {
        let options = ApiLoggerOptions {
            max_body_length,
            ..ApiLoggerOptions::default()
        };
        ApiLogger::new(&options, Arc::new(MemorySink::default()))
    }

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_default_options() {
        let options = ApiLoggerOptions::default();
        assert_eq!(options.redact_query, vec!["token", "password"]);
        assert_eq!(options.redact_body_fields, vec!["password", "ssn", "token"]);
        assert_eq!(options.max_body_length, 1500);
    }

    #[test]
    fn test_json_body_redacted() {
        let body = Bytes::from_static(br#"{"name":"Ada","password":"hunter2"}"#);
        let text = logger(1500)
            .request_body(&headers("application/json; charset=utf-8"), &body)
            .unwrap();

        assert!(!text.contains("hunter2"));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["password"], "[REDACTED]");
        assert_eq!(value["name"], "Ada");
    }

    #[test]
    fn test_form_body_redacted() {
        let body = Bytes::from_static(b"user=ada&SSN=123-45-6789");
        let text = logger(1500)
            .request_body(&headers("application/x-www-form-urlencoded"), &body)
            .unwrap();

        assert!(!text.contains("123-45-6789"));
        assert!(text.contains("\"SSN\":\"[REDACTED]\""));
    }

    #[test]
    fn test_unparseable_json_not_logged() {
        let body = Bytes::from_static(br#"{"password": "hunter2""#);
        assert!(
            logger(1500)
                .request_body(&headers("application/json"), &body)
                .is_none()
        );
    }

    #[test]
    fn test_json_without_content_type_redacted() {
        let body = Bytes::from_static(br#"{"name":"Ada","password":"hunter2"}"#);
        let text = logger(1500).request_body(&HeaderMap::new(), &body).unwrap();

        assert!(!text.contains("hunter2"));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["password"], "[REDACTED]");
    }

    #[test]
    fn test_non_json_body_not_logged() {
        let body = Bytes::from_static(b"password=hunter2 raw text");
        assert!(logger(1500).request_body(&headers("text/plain"), &body).is_none());
        assert!(logger(1500).request_body(&HeaderMap::new(), &body).is_none());
    }

    #[test]
    fn test_body_truncated() {
        let body = Bytes::from_static(br#"{"name":"abcdefghij","password":"x"}"#);
        let text = logger(4).request_body(&headers("text/plain"), &body).unwrap();
        assert_eq!(text, r#"{"na...[truncated]"#);
    }

    #[test]
    fn test_empty_body_absent() {
        assert!(
            logger(1500)
                .request_body(&headers("application/json"), &Bytes::new())
                .is_none()
        );
    }

    #[test]
    fn test_body_kind() {
        assert!(matches!(body_kind(&headers("application/json")), BodyKind::Json));
        assert!(matches!(
            body_kind(&headers("application/problem+json")),
            BodyKind::Json
        ));
        assert!(matches!(
            body_kind(&headers("application/x-www-form-urlencoded")),
            BodyKind::Form
        ));
        assert!(matches!(body_kind(&HeaderMap::new()), BodyKind::Other));
    }

    #[test]
    fn test_snapshot_uses_supplied_request_id() {
        let req = Request::builder()
            .uri("/api/users?token=abc&page=1")
            .header(REQUEST_ID_HEADER, "req-42")
            .header("authorization", "Basic abc")
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();

        let snapshot = logger(1500).snapshot(&parts);

        assert_eq!(snapshot.request_id, "req-42");
        assert_eq!(snapshot.url, "/api/users?token=%5BREDACTED%5D&page=1");
        assert_eq!(snapshot.request.query["token"], "[REDACTED]");
        assert_eq!(snapshot.request.headers["authorization"], "[REDACTED]");
    }

    #[test]
    fn test_snapshot_generates_request_id() {
        let (parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let snapshot = logger(1500).snapshot(&parts);
        assert!(Uuid::parse_str(&snapshot.request_id).is_ok());
    }
}
