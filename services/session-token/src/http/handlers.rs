//! Route handlers.

use crate::credentials::CredentialPair;
use crate::error::AuthError;
use crate::http::AppState;
use crate::metrics::{HTTP_LATENCY, SIGNIN_ATTEMPTS};
use crate::token::IssuedToken;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Body of `/welcome` and `/refresh`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Token previously returned by `/signin` or `/refresh`.
    pub token: String,
}

/// Body returned by `/welcome`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    /// `Welcome <subject>!`
    pub message: String,
}

/// `POST /signin`: exchange credentials for a token.
pub async fn signin(
    State(state): State<AppState>,
    payload: Result<Json<CredentialPair>, JsonRejection>,
) -> Result<Json<IssuedToken>, AuthError> {
    let _timer = HTTP_LATENCY.with_label_values(&["signin"]).start_timer();
    let Json(credentials) = payload.map_err(|e| AuthError::invalid_request(e.body_text()))?;

    let user = state
        .credentials
        .verify(&credentials)
        .await
        .inspect_err(|_| SIGNIN_ATTEMPTS.with_label_values(&["error"]).inc())?;

    let Some(user) = user else {
        SIGNIN_ATTEMPTS.with_label_values(&["rejected"]).inc();
        warn!(username = %credentials.username, "Sign-in rejected");
        return Err(AuthError::AuthenticationFailed);
    };

    let issued = state.issuer.issue(&user.username)?;
    SIGNIN_ATTEMPTS.with_label_values(&["accepted"]).inc();
    info!(user_id = user.id, username = %user.username, "Signed in");

    Ok(Json(issued))
}

/// `POST /welcome`: greet the holder of a valid token.
pub async fn welcome(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<WelcomeResponse>, AuthError> {
    let _timer = HTTP_LATENCY.with_label_values(&["welcome"]).start_timer();
    let Json(request) = payload.map_err(|_| AuthError::invalid_request("Token must be supplied"))?;

    let claims = state.validator.validate(&request.token)?;

    Ok(Json(WelcomeResponse {
        message: format!("Welcome {}!", claims.subject()),
    }))
}

/// `POST /refresh`: trade a nearly expired token for a new one.
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<IssuedToken>, AuthError> {
    let _timer = HTTP_LATENCY.with_label_values(&["refresh"]).start_timer();
    let Json(request) = payload.map_err(|_| AuthError::invalid_request("Token must be supplied"))?;

    state.refresh.refresh(&request.token).map(Json)
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /metrics`: Prometheus text format.
pub async fn metrics() -> impl IntoResponse {
    match crate::metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
