//! Error taxonomy for the token lifecycle.
//!
//! Every variant maps to a stable machine-readable code and is classified as
//! either a caller fault or a server fault. Messages are safe to return to
//! clients: they never contain key material or upstream error text.

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Errors produced by issuance, validation, refresh and sign-in.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Credentials did not match a known user. Never says which half was wrong.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Token could not be split or parsed.
    #[error("Token malformed")]
    Malformed,

    /// MAC verification failed.
    #[error("Invalid token signature")]
    SignatureInvalid,

    /// Signature valid but the token is past its expiry.
    #[error("Token expired")]
    Expired,

    /// Token is still fresh; refresh is allowed from `retry_at` on.
    #[error("Token is still fresh, retry refresh after {}", .retry_at.to_rfc3339_opts(SecondsFormat::Secs, true))]
    RefreshTooEarly {
        /// First instant at which a refresh will be accepted.
        retry_at: DateTime<Utc>,
    },

    /// The signing primitive failed.
    #[error("Internal signing error")]
    InternalSigning {
        /// Detail for server logs only.
        reason: String,
    },

    /// Request body could not be decoded.
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with the input.
        reason: String,
    },

    /// Credential backend could not be reached.
    #[error("Credential store unavailable")]
    StoreUnavailable {
        /// Detail for server logs only.
        reason: String,
    },
}

/// Stable error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// See [`AuthError::AuthenticationFailed`].
    AuthenticationFailed,
    /// See [`AuthError::Malformed`].
    Malformed,
    /// See [`AuthError::SignatureInvalid`].
    SignatureInvalid,
    /// See [`AuthError::Expired`].
    Expired,
    /// See [`AuthError::RefreshTooEarly`].
    RefreshTooEarly,
    /// See [`AuthError::InternalSigning`].
    InternalSigning,
    /// See [`AuthError::InvalidRequest`].
    InvalidRequest,
    /// See [`AuthError::StoreUnavailable`].
    StoreUnavailable,
}

impl ErrorCode {
    /// String form used on the wire and as a metric label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::Malformed => "TOKEN_MALFORMED",
            Self::SignatureInvalid => "TOKEN_SIGNATURE_INVALID",
            Self::Expired => "TOKEN_EXPIRED",
            Self::RefreshTooEarly => "REFRESH_TOO_EARLY",
            Self::InternalSigning => "INTERNAL_SIGNING_ERROR",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::StoreUnavailable => "CREDENTIAL_STORE_UNAVAILABLE",
        }
    }
}

impl AuthError {
    /// Build an internal signing error.
    pub fn signing(reason: impl Into<String>) -> Self {
        Self::InternalSigning {
            reason: reason.into(),
        }
    }

    /// Build an invalid request error.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Build a store unavailable error.
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Machine-readable kind of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::AuthenticationFailed => ErrorCode::AuthenticationFailed,
            Self::Malformed => ErrorCode::Malformed,
            Self::SignatureInvalid => ErrorCode::SignatureInvalid,
            Self::Expired => ErrorCode::Expired,
            Self::RefreshTooEarly { .. } => ErrorCode::RefreshTooEarly,
            Self::InternalSigning { .. } => ErrorCode::InternalSigning,
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            Self::StoreUnavailable { .. } => ErrorCode::StoreUnavailable,
        }
    }

    /// True for faults on our side rather than in the caller's input.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::InternalSigning { .. } | Self::StoreUnavailable { .. }
        )
    }

    /// Client-facing message. Server faults are reduced to a generic text.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InternalSigning { .. } => "Internal server error".to_string(),
            Self::StoreUnavailable { .. } => "Service temporarily unavailable".to_string(),
            other => other.to_string(),
        }
    }
}
