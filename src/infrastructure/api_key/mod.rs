//! API key infrastructure
//!
//! Key generation and the in-memory store that validates, revokes and
//! sweeps keys.

mod generator;
mod store;

pub use generator::{ApiKeyGenerator, GeneratedApiKey};
pub use store::ApiKeyStore;
