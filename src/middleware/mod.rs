//! HTTP middleware for authentication, request logging, and error shaping.
//!
//! # Architecture
//!
//! ```text
//! Request → Security headers → CORS → API logger → Exception filter → Auth (per route) → Handler
//!                                        ↓                ↓                  ↓
//!                                  LogRecord to sink   error document   Principal extension
//! ```
//!
//! # Security Considerations
//!
//! - Basic credentials are compared in constant time
//! - Bearer tokens are accepted only when signed with HS256
//! - Request logs never carry the values of redacted headers, query
//!   parameters, or top-level body fields

pub mod api_logger;
pub mod auth;
pub mod capture;
pub mod exception;
pub mod redact;

pub use api_logger::{ApiLoggerLayer, ApiLoggerOptions, REQUEST_ID_HEADER};
pub use auth::{AuthLayer, AuthUser};
pub use capture::{BoundedCapture, CaptureStream};
pub use exception::exception_filter;
pub use redact::{REDACTED, Redactor, TRUNCATION_MARKER, truncate_text};
