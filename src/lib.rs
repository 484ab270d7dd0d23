//! # User API
//!
//! A small Axum HTTP service exposing a mock user directory, built around
//! two reusable pieces of middleware:
//!
//! - **Authentication gate**: resolves a [`Principal`](auth::Principal)
//!   from HS256 bearer tokens or basic credentials, per route
//! - **API logger**: one structured record per request with redacted
//!   headers, query and body, plus a bounded copy of the response body
//!   captured while it streams
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Headers → CORS → API logger → Exception filter)│
//! ├─────────────────────────────────────────────────────────────┤
//! │  Auth gate (per route) → Handlers (health, users, docs)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  UserService (in-memory mock data)                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use user_api::{AppState, Config, build_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let addr = config.server_addr();
//!     let app = build_router(AppState::new(config));
//!
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```bash
//! JWT_SECRET=change-me LOG_REDACT_HEADERS=authorization,cookie,x-api-key cargo run
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

// Re-exports for convenience
pub use auth::{AuthGate, Principal, SecurityScheme};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use logging::{LogRecord, LogSink, MemorySink, TracingSink};
pub use routes::build_router;
pub use state::AppState;
