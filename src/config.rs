//! Application configuration loaded from environment variables.
//!
//! All configuration is loaded from environment variables with defaults
//! suitable for development. A `.env` file is honored when present.
//!
//! # Authentication
//!
//! - `JWT_SECRET`: HS256 signing secret for bearer tokens. Falls back to a
//!   hardcoded development secret when unset.
//!
//! # Request Logging
//!
//! - `LOG_REDACT_HEADERS`: header names whose values are redacted (default: `authorization,cookie`)
//! - `LOG_REDACT_QUERY`: query parameter names to redact (default: `token,password`)
//! - `LOG_REDACT_BODY_FIELDS`: top-level body fields to redact (default: `password,ssn,token`)
//! - `LOG_MAX_BODY_LENGTH`: characters of body text kept per record (default: 1500)

use std::env;

use crate::error::{AppError, AppResult};
use crate::middleware::ApiLoggerOptions;

/// Secret used when `JWT_SECRET` is not set. Development only.
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key";

/// Runtime environment, selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") || value.eq_ignore_ascii_case("prod") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Application configuration loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 8000)
    pub port: u16,

    /// Runtime environment (default: development)
    pub environment: Environment,

    // =========================================================================
    // Security Configuration
    // =========================================================================
    /// HS256 secret for bearer token verification
    pub jwt_secret: String,

    // =========================================================================
    // Request Logging Configuration
    // =========================================================================
    /// Redaction lists and body capture bounds for the API logger
    pub api_logger: ApiLoggerOptions,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if a value cannot be parsed or fails
    /// validation (e.g., non-numeric PORT, zero body length).
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = env::var("APP_ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or_default();
        let defaults = ApiLoggerOptions::default();

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 8000)?,
            environment,

            jwt_secret: env::var("JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),

            api_logger: ApiLoggerOptions {
                redact_headers: Self::parse_list("LOG_REDACT_HEADERS", defaults.redact_headers),
                redact_query: Self::parse_list("LOG_REDACT_QUERY", defaults.redact_query),
                redact_body_fields: Self::parse_list(
                    "LOG_REDACT_BODY_FIELDS",
                    defaults.redact_body_fields,
                ),
                max_body_length: Self::parse_env("LOG_MAX_BODY_LENGTH", defaults.max_body_length)?,
                max_request_body_size: Self::parse_env(
                    "MAX_REQUEST_BODY_SIZE",
                    defaults.max_request_body_size,
                )?,
            },

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| default_log_level(environment)),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    fn validate(&self) -> AppResult<()> {
        if self.api_logger.max_body_length == 0 {
            return Err(AppError::ConfigError(
                "LOG_MAX_BODY_LENGTH must be greater than 0".to_string(),
            ));
        }

        if self.api_logger.max_request_body_size == 0 {
            return Err(AppError::ConfigError(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// True when bearer tokens are checked against the built-in development secret.
    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .trim()
                .parse()
                .map_err(|e| AppError::ConfigError(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }

    /// Parse a comma-separated name list, keeping the default when unset.
    fn parse_list(name: &str, default: Vec<String>) -> Vec<String> {
        match env::var(name) {
            Ok(val) => val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => default,
        }
    }
}

fn default_log_level(environment: Environment) -> String {
    match environment {
        Environment::Production => "info".to_string(),
        Environment::Development => "debug".to_string(),
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            environment: Environment::Development,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            api_logger: ApiLoggerOptions::default(),
            log_level: default_log_level(Environment::Development),
        }
    }
}
