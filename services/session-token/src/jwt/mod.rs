//! Signed token format: claims, key and codec.

pub mod claims;
pub mod codec;
pub mod key;

pub use claims::{Claims, DEFAULT_EXPIRY};
pub use codec::TokenCodec;
pub use key::SigningKey;
