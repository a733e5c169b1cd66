//! In-memory TTL cache
//!
//! Every entry carries an absolute expiry instant. Reads treat an entry as
//! absent from that instant on, whether or not a sweep has removed it yet;
//! sweeping only reclaims memory.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::infrastructure::sweeper::Sweep;

/// Upper bound on stored lifetimes, keeps `Instant` arithmetic in range
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe keyed store with per-entry time-to-live
///
/// Advisory only: callers must stay correct when a lookup misses.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    name: &'static str,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::named("ttl_cache")
    }

    /// Creates an empty cache identified by `name` in sweep logs
    pub fn named(name: &'static str) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            name,
        }
    }

    /// Stores `value` under `key` until `ttl` from now, replacing any existing entry
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl.min(MAX_TTL);
        self.entries
            .write()
            .insert(key, CacheEntry { value, expires_at });
    }

    /// Returns a copy of the value if present and not yet expired
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let entries = self.entries.read();

        entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone())
    }

    /// Checks for a live entry without cloning its value
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remaining_ttl(key).is_some()
    }

    /// Time left before the entry expires, `None` if absent or expired
    pub fn remaining_ttl<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let entries = self.entries.read();

        entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.expires_at.duration_since(now))
    }

    /// Removes the entry, returning whether one was stored
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.write().remove(key).is_some()
    }

    /// Removes every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of stored entries
    ///
    /// Approximate: may include expired entries that have not been swept.
    pub fn size(&self) -> usize {
        self.entries.read().len()
    }

    /// Physically removes expired entries, returning how many were dropped
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();

        entries.retain(|_, entry| !entry.is_expired_at(now));

        before - entries.len()
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("entries", &self.entries.read().len())
            .finish()
    }
}

impl<K, V> Sweep for TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn sweep(&self) -> usize {
        self.remove_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_set_and_get() {
        let cache = TtlCache::new();

        cache.set("key1".to_string(), "value1".to_string(), Duration::from_secs(60));

        assert_eq!(cache.get("key1"), Some("value1".to_string()));
    }

    #[test]
    fn test_get_missing() {
        let cache: TtlCache<String, i32> = TtlCache::new();

        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let cache = TtlCache::new();

        cache.set("k", 1, Duration::from_secs(60));
        cache.set("k", 2, Duration::from_secs(60));

        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_expired_entry_is_absent_before_sweep() {
        let cache = TtlCache::new();

        cache.set("k", "v", Duration::from_millis(20));
        assert_eq!(cache.get("k"), Some("v"));

        thread::sleep(Duration::from_millis(40));

        assert_eq!(cache.get("k"), None);
        assert!(!cache.contains_key("k"));
        // not swept yet, still counted
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_zero_ttl_is_never_readable() {
        let cache = TtlCache::new();

        cache.set("k", "v", Duration::ZERO);

        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_overwrite_extends_expired_entry() {
        let cache = TtlCache::new();

        cache.set("k", 1, Duration::ZERO);
        cache.set("k", 2, Duration::from_secs(60));

        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_delete() {
        let cache = TtlCache::new();

        cache.set("k", 1, Duration::from_secs(60));

        assert!(cache.delete("k"));
        assert!(!cache.delete("k"));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_clear() {
        let cache = TtlCache::new();

        cache.set("a", 1, Duration::from_secs(60));
        cache.set("b", 2, Duration::from_secs(60));
        cache.clear();

        assert_eq!(cache.size(), 0);
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_remaining_ttl() {
        let cache = TtlCache::new();

        cache.set("k", 1, Duration::from_secs(60));

        let remaining = cache.remaining_ttl("k").unwrap();
        assert!(remaining > Duration::from_secs(50) && remaining <= Duration::from_secs(60));
        assert_eq!(cache.remaining_ttl("missing"), None);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let cache = TtlCache::new();

        cache.set("k", 1, Duration::MAX);

        assert_eq!(cache.get("k"), Some(1));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let cache = TtlCache::named("listing");

        cache.set("live", 1, Duration::from_secs(60));
        cache.set("dead", 2, Duration::ZERO);
        cache.set("also_dead", 3, Duration::ZERO);

        assert_eq!(cache.sweep(), 2);
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.get("live"), Some(1));
        assert_eq!(Sweep::name(&cache), "listing");
    }

    #[test]
    fn test_concurrent_writers() {
        let cache = Arc::new(TtlCache::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        cache.set(format!("{}:{}", t, i), i, Duration::from_secs(60));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.size(), 800);
        assert_eq!(cache.get("7:99"), Some(99));
    }
}
