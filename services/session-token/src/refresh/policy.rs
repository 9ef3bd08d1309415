//! Cooldown-gated token refresh.

use crate::clock::Clock;
use crate::error::AuthError;
use crate::metrics::TOKENS_REFRESHED;
use crate::token::{IssuedToken, TokenIssuer, TokenValidator};
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};

/// Default cooldown threshold: refresh opens 30 seconds before expiry.
pub const DEFAULT_COOLDOWN: std::time::Duration = std::time::Duration::from_secs(30);

/// Re-issues a token only once its remaining validity has dropped to the
/// cooldown threshold.
///
/// Tokens with more time left are rejected with `RefreshTooEarly`, which keeps
/// a client from stretching a session forever by hammering the endpoint.
/// Expired tokens are never refreshed.
pub struct RefreshPolicy {
    validator: Arc<TokenValidator>,
    issuer: Arc<TokenIssuer>,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
}

impl RefreshPolicy {
    /// Policy opening refresh once at most `cooldown` of validity remains.
    pub fn new(
        validator: Arc<TokenValidator>,
        issuer: Arc<TokenIssuer>,
        clock: Arc<dyn Clock>,
        cooldown: std::time::Duration,
    ) -> Self {
        Self {
            validator,
            issuer,
            clock,
            cooldown: Duration::from_std(cooldown).unwrap_or_else(|_| Duration::weeks(52 * 10_000)),
        }
    }

    /// Cooldown threshold in effect.
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Exchange `token` for a new one carrying the same subject.
    ///
    /// # Errors
    ///
    /// Any validation error unchanged, `RefreshTooEarly` while the token is
    /// still fresh, or `InternalSigning` from re-issuance.
    pub fn refresh(&self, token: &str) -> Result<IssuedToken, AuthError> {
        let now = self.clock.now();

        let claims = self.validator.validate_at(token, now).inspect_err(|e| {
            TOKENS_REFRESHED.with_label_values(&[e.code().as_str()]).inc();
        })?;

        let remaining = claims.remaining_at(now);
        if remaining > self.cooldown {
            let retry_at = claims.expires_at() - self.cooldown;
            TOKENS_REFRESHED.with_label_values(&["too_early"]).inc();
            warn!(
                subject = %claims.subject(),
                remaining_secs = remaining.num_seconds(),
                retry_at = %retry_at,
                "Refresh rejected, token still fresh"
            );
            return Err(AuthError::RefreshTooEarly { retry_at });
        }

        let issued = self.issuer.issue_at(claims.subject(), now)?;
        TOKENS_REFRESHED.with_label_values(&["refreshed"]).inc();
        info!(subject = %claims.subject(), "Refreshed session token");

        Ok(issued)
    }
}
