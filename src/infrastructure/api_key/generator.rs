//! API key generation
//!
//! Generates random API keys and their one-way digests.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Random bytes behind every generated key
const KEY_BYTES: usize = 32;

/// A freshly generated key and its stored digest
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// The full API key (only shown once at creation)
    pub key: String,
    /// Hex SHA-256 digest of the key
    pub hash: String,
}

/// Generator for API keys
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    /// Prefix for all generated keys (e.g. "isk_")
    prefix: String,
}

impl ApiKeyGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Generate a new random API key
    pub fn generate(&self) -> GeneratedApiKey {
        let mut random_bytes = [0u8; KEY_BYTES];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let key = format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(&random_bytes));
        let hash = Self::hash_key(&key);

        GeneratedApiKey { key, hash }
    }

    /// Wrap a caller-chosen secret, used for seeding well-known development keys
    pub fn from_secret(&self, secret: &str) -> GeneratedApiKey {
        GeneratedApiKey {
            key: secret.to_string(),
            hash: Self::hash_key(secret),
        }
    }

    /// Hex SHA-256 of the key.
    ///
    /// Fast and unsalted; keys are 256-bit random secrets, not passwords.
    pub fn hash_key(key: &str) -> String {
        let digest = Sha256::digest(key.as_bytes());
        hex::encode(digest)
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new("isk_")
    }
}
