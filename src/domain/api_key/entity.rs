//! API key record and its administrative view

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Number of hash characters exposed by administrative listings
pub const HASH_PREVIEW_LEN: usize = 16;

/// Lifecycle status of an API key, as seen by administrators
///
/// Validation never exposes this distinction; it only answers yes or no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    /// Key is active and inside its validity window
    Active,
    /// Key is still active but its expiry instant has passed
    Expired,
    /// Key has been revoked; revocation is permanent
    Revoked,
}

/// Stored API key record
///
/// Holds only the one-way hash of the secret. The plaintext is handed to the
/// caller once at creation and never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyRecord {
    key_hash: String,
    label: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    active: bool,
}

impl ApiKeyRecord {
    /// Create an active record expiring `expire_after_days` days after `now`
    ///
    /// Lifetimes past the representable range saturate at the latest instant.
    pub fn new(
        key_hash: impl Into<String>,
        label: impl Into<String>,
        now: DateTime<Utc>,
        expire_after_days: u32,
    ) -> Self {
        Self {
            key_hash: key_hash.into(),
            label: label.into(),
            created_at: now,
            expires_at: Duration::try_days(i64::from(expire_after_days))
                .and_then(|lifetime| now.checked_add_signed(lifetime))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            active: true,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A record is expired once `now` reaches its expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Usable iff active and strictly before the expiry instant
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired_at(now)
    }

    /// Inactive and expired records are the only ones the sweep may drop
    pub fn is_reclaimable_at(&self, now: DateTime<Utc>) -> bool {
        !self.active && self.is_expired_at(now)
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> KeyStatus {
        if !self.active {
            KeyStatus::Revoked
        } else if self.is_expired_at(now) {
            KeyStatus::Expired
        } else {
            KeyStatus::Active
        }
    }

    /// Permanently deactivate the record
    pub fn revoke(&mut self) {
        self.active = false;
    }

    /// Build the administrative view of this record
    pub fn info_at(&self, now: DateTime<Utc>) -> ApiKeyInfo {
        ApiKeyInfo {
            label: self.label.clone(),
            key_hash: hash_preview(&self.key_hash),
            created_at: self.created_at.timestamp(),
            expires_at: self.expires_at.timestamp(),
            active: self.active,
            is_expired: self.is_expired_at(now),
            status: self.status_at(now),
        }
    }
}

/// Key metadata safe to expose to administrators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyInfo {
    pub label: String,
    /// Truncated hash, never the full digest
    pub key_hash: String,
    /// Unix seconds
    pub created_at: i64,
    /// Unix seconds
    pub expires_at: i64,
    pub active: bool,
    pub is_expired: bool,
    pub status: KeyStatus,
}

fn hash_preview(hash: &str) -> String {
    let end = hash
        .char_indices()
        .nth(HASH_PREVIEW_LEN)
        .map(|(i, _)| i)
        .unwrap_or(hash.len());
    format!("{}...", &hash[..end])
}
