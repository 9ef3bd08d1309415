//! Credential lookup consulted before a token is issued.

pub mod memory;

pub use memory::InMemoryCredentialStore;

use crate::error::AuthError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Username/password pair from a sign-in request. Never persisted.
#[derive(Clone, Deserialize)]
pub struct CredentialPair {
    /// Login name.
    pub username: String,
    /// Plaintext password as submitted.
    pub password: String,
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Account data returned for a successful match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Store-assigned identifier, unique per store.
    pub id: u64,
    /// Login name, also the token subject.
    pub username: String,
    /// Contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Resolves credentials to a user.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when the user is unknown or the password is wrong; callers
    /// cannot tell the two apart.
    ///
    /// # Errors
    ///
    /// [`AuthError::StoreUnavailable`] when the backend cannot answer.
    async fn verify(&self, credentials: &CredentialPair) -> Result<Option<UserRecord>, AuthError>;
}
