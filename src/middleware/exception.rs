//! Exception filter.
//!
//! Handlers return [`AppError`](crate::error::AppError), whose response
//! carries a [`HandledError`] marker. This middleware rewrites those
//! responses into the full error document, adding the request path and
//! method, and logs the failure with its internal detail.

use axum::Json;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::error::{ErrorResponse, HandledError};

pub async fn exception_filter(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    // Path only; the query may carry values the request log redacts.
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let Some(handled) = response.extensions().get::<HandledError>().cloned() else {
        return response;
    };

    error!(
        method = %method,
        path = %path,
        status = handled.status.as_u16(),
        error = %handled.detail,
        "Request failed"
    );

    let body = ErrorResponse::new(handled.status, handled.message).with_request(method, path);
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);

    let mut rewritten = (parts.status, Json(body)).into_response();
    for (name, value) in parts.headers.iter() {
        rewritten
            .headers_mut()
            .entry(name)
            .or_insert_with(|| value.clone());
    }
    rewritten
}
