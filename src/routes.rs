//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (outermost first)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │ Security headers │ ← helmet-style response headers
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │      CORS        │ ← mirrors request origin, credentials allowed
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │    API logger    │ ← one LogRecord per request, 413 if body too large
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ Exception filter │ ← uniform error document
//! └────────┬─────────┘
//!          │
//!          ▼
//!   Auth (per route) → Handler
//! ```
//!
//! # Route Groups
//!
//! Everything is mounted under `/api`; see [`crate::openapi::ROUTES`].

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, header};
use axum::routing::get;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

use crate::auth::SecurityScheme;
use crate::handlers;
use crate::middleware::{ApiLoggerLayer, AuthLayer, exception_filter};
use crate::openapi::API_PREFIX;
use crate::state::AppState;

/// Response headers added to every response unless a handler set them.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Build the application router with all routes and middleware configured.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;
    let basic_auth = AuthLayer::new(state.auth_gate.clone(), SecurityScheme::Basic);

    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/users",
            get(handlers::list_users)
                .layer(basic_auth)
                .post(handlers::create_user),
        )
        .route("/users/search", get(handlers::search_users))
        .route("/users/{id}", get(handlers::get_user))
        .route("/docs.json", get(handlers::openapi_document));

    let mut router = Router::new()
        .nest(API_PREFIX, api)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(config.api_logger.max_request_body_size))
        .layer(axum::middleware::from_fn(exception_filter));

    info!(
        max_body_length = config.api_logger.max_body_length,
        redact_headers = config.api_logger.redact_headers.len(),
        redact_query = config.api_logger.redact_query.len(),
        redact_body_fields = config.api_logger.redact_body_fields.len(),
        "API logger configured"
    );
    router = router.layer(ApiLoggerLayer::new(
        &config.api_logger,
        state.log_sink.clone(),
    ));

    router = router.layer(build_cors_layer());

    for &(name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    router.with_state(state)
}

/// CORS that reflects the caller's origin, method and headers and allows
/// credentials.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([header::CONTENT_LENGTH])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    #[test]
    fn test_security_header_names_are_valid() {
        for (name, value) in SECURITY_HEADERS {
            assert!(HeaderName::from_bytes(name.as_bytes()).is_ok(), "{name}");
            assert!(HeaderValue::from_str(value).is_ok(), "{name}");
        }
    }

    #[tokio::test]
    async fn test_cors_mirrors_origin() {
        let app = build_router(AppState::new(Config::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header(header::ORIGIN, "https://app.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );
    }

    #[tokio::test]
    async fn test_preflight() {
        let app = build_router(AppState::new(Config::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/users")
                    .header(header::ORIGIN, "https://app.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
            "POST"
        );
        assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let app = build_router(AppState::new(Config::default()));
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], br#"{"message":"Not found"}"#);
    }
}
