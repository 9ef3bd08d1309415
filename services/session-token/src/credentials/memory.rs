//! Credential store held in process memory, seeded from a JSON file.

use crate::credentials::{CredentialPair, CredentialStore, UserRecord};
use crate::error::AuthError;
use anyhow::Context;
use argon2::{
    Argon2,
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Checked when the username is unknown, so a miss costs the same Argon2 run
/// as a wrong password. Nobody knows the password behind it.
const UNKNOWN_USER_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$32HHxu7hNx+GlVcDvCSiog$saTvWLks0J1/mFgYQFkdEyrxg6Jg0bGiufOlA+s0sEM";

struct Entry {
    record: UserRecord,
    password_hash: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedUser {
    username: String,
    password_hash: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

/// Hash a password into an Argon2id PHC string with a random salt.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Credential store held in process memory.
///
/// Only Argon2 PHC hashes are kept; plaintext passwords never reach it.
/// Ids come from a counter that only moves forward, so replacing a user keeps
/// their id and never hands it to someone else.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: HashMap<String, Entry>,
    next_id: u64,
}

impl InMemoryCredentialStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a user with only a username, hashing
    /// `password` on the way in.
    ///
    /// # Errors
    ///
    /// Returns `argon2::password_hash::Error` if hashing fails.
    pub fn with_user(mut self, username: impl Into<String>, password: &str) -> Result<Self, password_hash::Error> {
        let record = UserRecord {
            id: 0,
            username: username.into(),
            email: None,
            first_name: None,
            last_name: None,
        };
        self.insert(record, &hash_password(password)?)?;
        Ok(self)
    }

    /// Add or replace a user by username and return the id it was stored
    /// under. `record.id` is ignored: a replaced user keeps their id, a new
    /// one takes the next id.
    ///
    /// # Errors
    ///
    /// Returns `argon2::password_hash::Error` if `password_hash` is not a
    /// valid PHC string.
    pub fn insert(&mut self, mut record: UserRecord, password_hash: &str) -> Result<u64, password_hash::Error> {
        PasswordHash::new(password_hash)?;

        record.id = match self.users.get(&record.username) {
            Some(existing) => existing.record.id,
            None => {
                self.next_id += 1;
                self.next_id
            }
        };
        let id = record.id;
        self.users.insert(
            record.username.clone(),
            Entry {
                record,
                password_hash: password_hash.to_string(),
            },
        );
        Ok(id)
    }

    /// Parse a JSON array of
    /// `{username, passwordHash, email?, firstName?, lastName?}` where
    /// `passwordHash` is an Argon2 PHC string.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON or an unparsable hash.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let seeds: Vec<SeedUser> = serde_json::from_str(json)?;
        let mut store = Self::new();
        for seed in seeds {
            let record = UserRecord {
                id: 0,
                username: seed.username,
                email: seed.email,
                first_name: seed.first_name,
                last_name: seed.last_name,
            };
            let username = record.username.clone();
            store
                .insert(record, &seed.password_hash)
                .map_err(|e| anyhow::anyhow!("invalid password hash for {username}: {e}"))?;
        }
        Ok(store)
    }

    /// Load users from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading credentials file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing credentials file {}", path.display()))
    }

    /// Number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// True when no user has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn password_matches(password: &str, phc: &str) -> Result<bool, password_hash::Error> {
    let parsed = PasswordHash::new(phc)?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn verify(&self, credentials: &CredentialPair) -> Result<Option<UserRecord>, AuthError> {
        let (phc, record) = match self.users.get(&credentials.username) {
            Some(entry) => (entry.password_hash.clone(), Some(&entry.record)),
            None => (UNKNOWN_USER_HASH.to_string(), None),
        };

        // Argon2 verification is CPU-bound; run it off the async workers.
        let password = credentials.password.clone();
        let matches = tokio::task::spawn_blocking(move || password_matches(&password, &phc))
            .await
            .map_err(|e| AuthError::store_unavailable(e.to_string()))?
            .map_err(|e| AuthError::store_unavailable(e.to_string()))?;

        Ok(record.filter(|_| matches).cloned())
    }
}
