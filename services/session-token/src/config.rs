//! Service configuration.
//!
//! Loaded from environment variables (a `.env` file is honoured) and
//! validated once at startup.

use crate::jwt::{DEFAULT_EXPIRY, SigningKey};
use crate::observability::{LogFormat, LogSettings};
use crate::refresh::DEFAULT_COOLDOWN;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },

    /// Token lifetime must be positive.
    #[error("Invalid TOKEN_TTL_SECS: must be greater than 0")]
    InvalidTtl,

    /// Cooldown must leave part of the lifetime closed to refresh.
    #[error("Invalid REFRESH_COOLDOWN_SECS: {cooldown}s must be less than TOKEN_TTL_SECS ({ttl}s)")]
    InvalidCooldown {
        /// Configured cooldown in seconds
        cooldown: u64,
        /// Configured lifetime in seconds
        ttl: u64,
    },

    /// Signing key set but empty.
    #[error("SIGNING_KEY must not be empty")]
    EmptySigningKey,
}

/// Session token service configuration.
#[derive(Debug)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// HMAC secret shared by issuer and validator
    pub signing_key: SigningKey,
    /// True when no key was configured and a random one was generated
    pub signing_key_generated: bool,
    /// Lifetime of issued tokens
    pub token_ttl: Duration,
    /// Remaining validity at or below which refresh is allowed
    pub refresh_cooldown: Duration,
    /// JSON file seeding the in-memory credential store
    pub credentials_path: Option<PathBuf>,
    /// Log level and format
    pub logging: LogSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or the values are
    /// inconsistent.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&lookup, "PORT", 8080)?;

        let ttl_secs = parse_var(&lookup, "TOKEN_TTL_SECS", DEFAULT_EXPIRY.as_secs())?;
        if ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl);
        }
        let cooldown_secs = parse_var(&lookup, "REFRESH_COOLDOWN_SECS", DEFAULT_COOLDOWN.as_secs())?;
        if cooldown_secs >= ttl_secs {
            return Err(ConfigError::InvalidCooldown {
                cooldown: cooldown_secs,
                ttl: ttl_secs,
            });
        }

        let (signing_key, signing_key_generated) = match lookup("SIGNING_KEY") {
            Some(raw) => (
                SigningKey::new(raw.into_bytes()).map_err(|_| ConfigError::EmptySigningKey)?,
                false,
            ),
            None => (SigningKey::generate(), true),
        };

        let credentials_path = lookup("CREDENTIALS_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let logging = LogSettings {
            level: parse_var(&lookup, "LOG_LEVEL", tracing::Level::INFO)?,
            format: if parse_var(&lookup, "LOG_JSON", false)? {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
        };

        Ok(Self {
            host,
            port,
            signing_key,
            signing_key_generated,
            token_ttl: Duration::from_secs(ttl_secs),
            refresh_cooldown: Duration::from_secs(cooldown_secs),
            credentials_path,
            logging,
        })
    }

    /// `host:port` string for binding.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a variable with a default value.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_ttl, Duration::from_secs(300));
        assert_eq!(config.refresh_cooldown, Duration::from_secs(30));
        assert!(config.signing_key_generated);
        assert!(config.credentials_path.is_none());
        assert_eq!(config.logging, LogSettings::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("SIGNING_KEY", "my_secret_key"),
            ("TOKEN_TTL_SECS", "600"),
            ("REFRESH_COOLDOWN_SECS", "60"),
            ("CREDENTIALS_PATH", "/etc/users.json"),
            ("LOG_LEVEL", "debug"),
            ("LOG_JSON", "true"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert!(!config.signing_key_generated);
        assert_eq!(config.signing_key.len(), "my_secret_key".len());
        assert_eq!(config.token_ttl, Duration::from_secs(600));
        assert_eq!(config.refresh_cooldown, Duration::from_secs(60));
        assert_eq!(config.credentials_path, Some(PathBuf::from("/etc/users.json")));
        assert_eq!(config.logging.level, tracing::Level::DEBUG);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let err = load(&[("LOG_LEVEL", "verbose")]).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { ref name, .. } if name == "LOG_LEVEL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("PORT", "99999")]).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { ref name, .. } if name == "PORT"));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        assert_eq!(load(&[("TOKEN_TTL_SECS", "0")]).unwrap_err(), ConfigError::InvalidTtl);
    }

    #[test]
    fn test_cooldown_must_be_below_ttl() {
        let err = load(&[("TOKEN_TTL_SECS", "300"), ("REFRESH_COOLDOWN_SECS", "7200")]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidCooldown { cooldown: 7200, ttl: 300 });
    }

    #[test]
    fn test_empty_signing_key_rejected() {
        assert_eq!(load(&[("SIGNING_KEY", "")]).unwrap_err(), ConfigError::EmptySigningKey);
    }
}
