//! Cache infrastructure - in-memory TTL cache

mod ttl_cache;

pub use ttl_cache::TtlCache;
