//! Shared application state for Axum handlers.
//!
//! Everything in here is immutable after startup and shared through `Arc`,
//! so cloning the state per request is cheap and no locking is involved.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::AuthGate;
use crate::config::Config;
use crate::logging::{LogSink, TracingSink};
use crate::services::UserService;

/// Shared application state for Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Mock user directory
    pub users: UserService,
    /// Authentication gate used by protected routes
    pub auth_gate: Arc<AuthGate>,
    /// Destination for request log records
    pub log_sink: Arc<dyn LogSink>,
    /// Timestamp when the application started
    pub started_at: Instant,
}

impl AppState {
    /// Create state that logs requests through `tracing`.
    pub fn new(config: Config) -> Self {
        Self::with_log_sink(config, Arc::new(TracingSink))
    }

    /// Create state with an explicit log sink.
    pub fn with_log_sink(config: Config, log_sink: Arc<dyn LogSink>) -> Self {
        let auth_gate = Arc::new(AuthGate::new(&config.jwt_secret));

        Self {
            config: Arc::new(config),
            users: UserService::new(),
            auth_gate,
            log_sink,
            started_at: Instant::now(),
        }
    }

    /// Get application uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;

    #[test]
    fn test_state_uses_injected_sink() {
        let sink = Arc::new(MemorySink::default());
        let state = AppState::with_log_sink(Config::default(), sink.clone());

        assert_eq!(Arc::strong_count(&sink), 2);
        assert_eq!(state.uptime_seconds(), 0);
    }
}
