//! Token payload and its time arithmetic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default lifetime of a freshly issued token.
pub const DEFAULT_EXPIRY: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// Token payload.
///
/// Fields are fixed at construction; a refresh builds a new value instead of
/// touching an existing one. Custom claims live in their own map and are
/// flattened into the JSON payload next to the registered ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    exp: i64,
    #[serde(flatten)]
    custom: BTreeMap<String, serde_json::Value>,
}

impl Claims {
    /// Claims for `subject` issued at `now`, valid for `lifetime`.
    ///
    /// The lifetime is rounded down to whole seconds but never below one, so
    /// `expires_at() > now` always holds.
    pub fn new(subject: impl Into<String>, now: DateTime<Utc>, lifetime: std::time::Duration) -> Self {
        let issued_at = now.timestamp();
        let ttl = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX).max(1);
        Self {
            sub: subject.into(),
            iat: Some(issued_at),
            exp: issued_at.saturating_add(ttl),
            custom: BTreeMap::new(),
        }
    }

    /// Attach an application-defined claim.
    #[must_use]
    pub fn with_custom_claim(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }

    /// The principal this token speaks for.
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Expiry as a Unix timestamp.
    pub const fn exp(&self) -> i64 {
        self.exp
    }

    /// Expiry as an instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Issuance instant, absent on tokens minted without `iat`.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|iat| DateTime::from_timestamp(iat, 0))
    }

    /// Look up an application-defined claim.
    pub fn custom_claim(&self, key: &str) -> Option<&serde_json::Value> {
        self.custom.get(key)
    }

    /// True once `now` has reached the expiry second.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Validity left at `now`; negative once expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        Duration::seconds(self.exp.saturating_sub(now.timestamp()))
    }
}
