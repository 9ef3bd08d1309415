//! Signature and expiry checks.

use crate::clock::Clock;
use crate::error::AuthError;
use crate::jwt::{Claims, TokenCodec};
use crate::metrics::TOKEN_VALIDATIONS;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Verifies tokens: signature first, then expiry.
///
/// The order is fixed so that a tampered token never reveals its expiry
/// through an `Expired` result.
pub struct TokenValidator {
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl TokenValidator {
    /// Validator sharing the issuer's codec and clock.
    pub fn new(codec: Arc<TokenCodec>, clock: Arc<dyn Clock>) -> Self {
        Self { codec, clock }
    }

    /// Validate against the current time.
    ///
    /// # Errors
    ///
    /// `Malformed`, `SignatureInvalid` or `Expired`.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, self.clock.now())
    }

    /// Validate against an explicit `now` snapshot.
    ///
    /// # Errors
    ///
    /// `Malformed`, `SignatureInvalid` or `Expired`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let result = self.codec.decode(token).and_then(|claims| {
            if claims.is_expired_at(now) {
                Err(AuthError::Expired)
            } else {
                Ok(claims)
            }
        });

        match &result {
            Ok(claims) => {
                TOKEN_VALIDATIONS.with_label_values(&["ok"]).inc();
                debug!(subject = %claims.subject(), "Token validated");
            }
            Err(e) => {
                TOKEN_VALIDATIONS.with_label_values(&[e.code().as_str()]).inc();
                debug!(code = e.code().as_str(), "Token rejected");
            }
        }

        result
    }
}
