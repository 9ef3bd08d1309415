//! Token issuance and validation on top of the codec.

pub mod issuer;
pub mod validator;

pub use issuer::TokenIssuer;
pub use validator::TokenValidator;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A freshly minted token together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    /// Bearer token string handed to the client.
    pub token: String,
    /// Instant after which the token is rejected as expired.
    pub expires_at: DateTime<Utc>,
}
