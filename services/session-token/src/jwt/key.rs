//! Process-wide HMAC secret.

use crate::error::AuthError;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretSlice};

/// Length of keys produced by [`SigningKey::generate`].
pub const GENERATED_KEY_LEN: usize = 32;

/// Shared signing secret. Debug output is redacted.
#[derive(Debug)]
pub struct SigningKey {
    secret: SecretSlice<u8>,
}

impl SigningKey {
    /// Wrap raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InternalSigning`] for an empty key.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, AuthError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AuthError::signing("signing key must not be empty"));
        }
        Ok(Self {
            secret: SecretSlice::from(bytes),
        })
    }

    /// Random key for development setups without a configured secret.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; GENERATED_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            secret: SecretSlice::from(bytes),
        }
    }

    /// Key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secret.expose_secret().len()
    }

    /// Always false; empty keys are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.secret.expose_secret()
    }
}
