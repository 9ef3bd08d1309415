//! HTTP mapping for [`AuthError`].

use crate::error::AuthError;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

/// JSON error body: a stable code plus a human-readable message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Stable [`crate::ErrorCode`] string.
    pub code: &'static str,
    /// Sanitized message.
    pub message: String,
    /// Set only for `REFRESH_TOO_EARLY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_at: Option<DateTime<Utc>>,
}

/// Status code for each error kind.
#[must_use]
pub const fn status_for(error: &AuthError) -> StatusCode {
    match error {
        AuthError::AuthenticationFailed | AuthError::SignatureInvalid | AuthError::Expired => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::Malformed | AuthError::RefreshTooEarly { .. } => StatusCode::BAD_REQUEST,
        AuthError::InvalidRequest { .. } => StatusCode::NOT_ACCEPTABLE,
        AuthError::InternalSigning { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let code = self.code().as_str();

        match &self {
            AuthError::InternalSigning { reason } | AuthError::StoreUnavailable { reason } => {
                error!(code, reason = %reason, "Server fault");
            }
            other => debug!(code, error = %other, "Request rejected"),
        }

        let body = ErrorBody {
            code,
            message: self.public_message(),
            retry_at: match &self {
                AuthError::RefreshTooEarly { retry_at } => Some(*retry_at),
                _ => None,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
