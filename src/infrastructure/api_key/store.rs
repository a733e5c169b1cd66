//! In-memory API key store
//!
//! Keys are indexed by the digest of their plaintext. Validation collapses
//! "unknown", "expired" and "revoked" into a single `false`; only the
//! administrative listing tells them apart.

use std::collections::HashMap;
use std::fmt;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::generator::{ApiKeyGenerator, GeneratedApiKey};
use crate::domain::api_key::{ApiKeyInfo, ApiKeyRecord, HASH_PREVIEW_LEN};
use crate::infrastructure::sweeper::Sweep;

/// Owner of every API key record
pub struct ApiKeyStore {
    generator: ApiKeyGenerator,
    records: RwLock<HashMap<String, ApiKeyRecord>>,
}

impl ApiKeyStore {
    pub fn new(generator: ApiKeyGenerator) -> Self {
        Self {
            generator,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a new random key valid for `expire_after_days` days
    ///
    /// The returned plaintext is not retained and cannot be recovered.
    pub fn create_key(&self, label: &str, expire_after_days: u32) -> String {
        let generated = self.generator.generate();
        self.insert(label, generated, expire_after_days)
    }

    /// Register a caller-chosen secret as a key
    ///
    /// Registering the same secret again replaces the earlier record.
    pub fn create_key_with_secret(&self, label: &str, secret: &str, expire_after_days: u32) -> String {
        let generated = self.generator.from_secret(secret);
        self.insert(label, generated, expire_after_days)
    }

    fn insert(&self, label: &str, generated: GeneratedApiKey, expire_after_days: u32) -> String {
        let record = ApiKeyRecord::new(&generated.hash, label, Utc::now(), expire_after_days);

        info!(
            label,
            key_hash = short_hash(&generated.hash),
            expires_at = %record.expires_at(),
            "API key created"
        );

        self.records.write().insert(generated.hash, record);

        generated.key
    }

    /// True iff the key exists, is active and has not expired
    pub fn validate_key(&self, plaintext: &str) -> bool {
        let hash = ApiKeyGenerator::hash_key(plaintext);
        let now = Utc::now();

        self.records
            .read()
            .get(&hash)
            .is_some_and(|record| record.is_usable_at(now))
    }

    /// Permanently deactivate a key, false if no such key exists
    pub fn revoke_key(&self, plaintext: &str) -> bool {
        let hash = ApiKeyGenerator::hash_key(plaintext);
        let mut records = self.records.write();

        match records.get_mut(&hash) {
            Some(record) => {
                record.revoke();
                info!(key_hash = short_hash(&hash), "API key revoked");
                true
            }
            None => false,
        }
    }

    /// Administrative view of a single key
    pub fn key_info(&self, plaintext: &str) -> Option<ApiKeyInfo> {
        let hash = ApiKeyGenerator::hash_key(plaintext);

        self.records
            .read()
            .get(&hash)
            .map(|record| record.info_at(Utc::now()))
    }

    /// Metadata for every stored key, oldest first
    pub fn list_keys(&self) -> Vec<ApiKeyInfo> {
        let now = Utc::now();
        let records = self.records.read();

        let mut keys: Vec<_> = records.values().map(|record| record.info_at(now)).collect();
        keys.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.label.cmp(&b.label)));
        keys
    }

    /// Drop records that are both revoked and expired
    pub fn remove_reclaimable(&self) -> usize {
        let now = Utc::now();
        let mut records = self.records.write();
        let before = records.len();

        records.retain(|_, record| !record.is_reclaimable_at(now));

        let removed = before - records.len();
        if removed > 0 {
            debug!(removed, "Removed revoked and expired API keys");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for ApiKeyStore {
    fn default() -> Self {
        Self::new(ApiKeyGenerator::default())
    }
}

impl fmt::Debug for ApiKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyStore")
            .field("generator", &self.generator)
            .field("records", &self.len())
            .finish()
    }
}

impl Sweep for ApiKeyStore {
    fn name(&self) -> &'static str {
        "api_keys"
    }

    fn sweep(&self) -> usize {
        self.remove_reclaimable()
    }
}

fn short_hash(hash: &str) -> &str {
    &hash[..HASH_PREVIEW_LEN.min(hash.len())]
}
