//! Token refresh.

pub mod policy;

pub use policy::{DEFAULT_COOLDOWN, RefreshPolicy};
