//! API key domain
//!
//! Record and status types for the API key lifecycle. The store that owns
//! these records lives in `infrastructure::api_key`.

mod entity;

pub use entity::{ApiKeyInfo, ApiKeyRecord, KeyStatus, HASH_PREVIEW_LEN};
