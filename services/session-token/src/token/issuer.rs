//! Token issuance for authenticated identities.

use crate::clock::Clock;
use crate::error::AuthError;
use crate::jwt::{Claims, TokenCodec};
use crate::metrics::TOKENS_ISSUED;
use crate::token::IssuedToken;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Mints tokens for authenticated identities.
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
    expiry: Duration,
}

impl TokenIssuer {
    /// Issuer signing with `codec`, reading `clock`, minting tokens valid for `expiry`.
    pub fn new(codec: Arc<TokenCodec>, clock: Arc<dyn Clock>, expiry: Duration) -> Self {
        Self {
            codec,
            clock,
            expiry,
        }
    }

    /// Lifetime given to every new token.
    pub const fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Issue a token for `subject`, valid from now for the configured expiry.
    ///
    /// # Errors
    ///
    /// [`AuthError::InternalSigning`] if signing fails.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, self.clock.now())
    }

    /// Issue against an explicit `now` snapshot.
    ///
    /// # Errors
    ///
    /// [`AuthError::InternalSigning`] if signing fails.
    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let claims = Claims::new(subject, now, self.expiry);
        let token = self.codec.encode(&claims).inspect_err(|e| {
            error!(subject = %subject, error = ?e, "Token signing failed");
        })?;

        TOKENS_ISSUED.inc();
        info!(
            subject = %subject,
            expires_at = %claims.expires_at(),
            "Issued session token"
        );

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }
}
