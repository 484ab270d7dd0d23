//! Per-route authentication layer.
//!
//! Runs the [`AuthGate`] for the route's [`SecurityScheme`] and, on success,
//! stores the [`Principal`] in request extensions. The request always
//! continues to the handler; handlers read the outcome with [`AuthUser`]
//! and decide how to answer an anonymous caller.
//!
//! # Usage
//!
//! ```rust,ignore
//! let basic = AuthLayer::new(gate.clone(), SecurityScheme::Basic);
//! Router::new().route("/users", get(list_users).layer(basic));
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::FromRequestParts;
use axum::http::Request;
use axum::http::request::Parts;
use tower::{Layer, Service};
use tracing::debug;

use crate::auth::{AuthGate, Principal, SecurityScheme};

/// Authentication layer for one security scheme.
#[derive(Clone)]
pub struct AuthLayer {
    gate: Arc<AuthGate>,
    scheme: SecurityScheme,
}

impl AuthLayer {
    pub fn new(gate: Arc<AuthGate>, scheme: SecurityScheme) -> Self {
        Self { gate, scheme }
    }

    pub fn scheme(&self) -> SecurityScheme {
        self.scheme
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            gate: self.gate.clone(),
            scheme: self.scheme,
        }
    }
}

/// Authentication service wrapper.
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    gate: Arc<AuthGate>,
    scheme: SecurityScheme,
}

impl<S, B> Service<Request<B>> for AuthService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        match self.gate.authenticate(req.headers(), self.scheme) {
            Some(principal) => {
                debug!(scheme = %self.scheme, path = %req.uri().path(), "Request authenticated");
                req.extensions_mut().insert(principal);
            }
            None => {
                debug!(scheme = %self.scheme, path = %req.uri().path(), "No principal resolved");
            }
        }

        self.inner.call(req)
    }
}

/// Extractor for the principal resolved by [`AuthLayer`], if any.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Option<Principal>);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthUser(parts.extensions.get::<Principal>().cloned()))
    }
}
