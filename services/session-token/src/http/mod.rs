//! HTTP API.
//!
//! | Route          | Body                     | Success                |
//! |----------------|--------------------------|------------------------|
//! | `POST /signin` | `{username, password}`   | `{token, expiresAt}`   |
//! | `POST /welcome`| `{token}`                | `{message}`            |
//! | `POST /refresh`| `{token}`                | `{token, expiresAt}`   |
//! | `GET /health`  |                          | `{status}`             |
//! | `GET /metrics` |                          | Prometheus text        |
//!
//! Errors are returned as `{code, message}` with a per-kind status code.

pub mod error;
pub mod handlers;

use crate::clock::Clock;
use crate::credentials::CredentialStore;
use crate::jwt::{SigningKey, TokenCodec};
use crate::observability;
use crate::refresh::RefreshPolicy;
use crate::token::{TokenIssuer, TokenValidator};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Shared handler state. Everything inside is read-only.
#[derive(Clone)]
pub struct AppState {
    /// Issues tokens after sign-in.
    pub issuer: Arc<TokenIssuer>,
    /// Gate for protected routes.
    pub validator: Arc<TokenValidator>,
    /// Refresh gate.
    pub refresh: Arc<RefreshPolicy>,
    /// Username/password lookup.
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    /// Wire the lifecycle components around one signing key and one clock.
    pub fn new(
        key: &SigningKey,
        token_ttl: Duration,
        refresh_cooldown: Duration,
        clock: Arc<dyn Clock>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(key));
        let issuer = Arc::new(TokenIssuer::new(codec.clone(), clock.clone(), token_ttl));
        let validator = Arc::new(TokenValidator::new(codec, clock.clone()));
        let refresh = Arc::new(RefreshPolicy::new(
            validator.clone(),
            issuer.clone(),
            clock,
            refresh_cooldown,
        ));

        Self {
            issuer,
            validator,
            refresh,
            credentials,
        }
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/signin", post(handlers::signin))
        .route("/welcome", post(handlers::welcome))
        .route("/refresh", post(handlers::refresh))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(observability::request_span)
                .on_response(observability::record_response),
        )
        .with_state(state)
}
