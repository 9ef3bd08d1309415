//! Session Token Service library.
//!
//! Issues, validates and refreshes stateless HMAC-signed session tokens.
//! Nothing about a session is stored server-side: the token carries its own
//! subject and expiry, and the shared signing key proves it is unaltered.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod jwt;
pub mod metrics;
pub mod observability;
pub mod refresh;
pub mod token;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{AuthError, ErrorCode};
pub use jwt::{Claims, SigningKey, TokenCodec};
pub use refresh::RefreshPolicy;
pub use token::{IssuedToken, TokenIssuer, TokenValidator};
