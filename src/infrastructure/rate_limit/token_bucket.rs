//! Per-client token bucket with a concurrency cap
//!
//! Two gates decide admission: the number of un-released requests for the
//! client must be under `max_concurrent`, and the client's bucket must hold at
//! least one token. The bucket refills continuously at `requests_per_second`
//! and holds at most that many tokens. Both gates are evaluated under one lock.
//!
//! Client state is created on first sight and never evicted.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::debug;

use crate::domain::DomainError;

/// Admission limits applied to every client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Refill rate, also the bucket capacity
    pub requests_per_second: u32,
    /// Maximum simultaneous in-flight requests per client
    pub max_concurrent: u32,
}

impl RateLimitConfig {
    pub fn new(requests_per_second: u32, max_concurrent: u32) -> Self {
        Self {
            requests_per_second,
            max_concurrent,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.requests_per_second == 0 {
            return Err(DomainError::validation(
                "requests_per_second must be at least 1",
            ));
        }

        if self.max_concurrent == 0 {
            return Err(DomainError::validation("max_concurrent must be at least 1"));
        }

        Ok(())
    }

    fn capacity(&self) -> f64 {
        f64::from(self.requests_per_second)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(100, 10)
    }
}

#[derive(Debug)]
struct RateState {
    tokens: f64,
    last_refill: Instant,
    in_flight: u32,
}

impl RateState {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
            in_flight: 0,
        }
    }

    fn refill(&mut self, config: &RateLimitConfig, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * config.capacity()).min(config.capacity());
        self.last_refill = now;
    }
}

/// Rate limiter keyed by client address
pub struct TokenBucketLimiter {
    config: RateLimitConfig,
    clients: Mutex<HashMap<String, RateState>>,
}

impl TokenBucketLimiter {
    /// Create a limiter, rejecting zero limits
    pub fn new(config: RateLimitConfig) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            config,
            clients: Mutex::new(HashMap::new()),
        })
    }

    /// Decide whether to admit a request from `client`
    ///
    /// On `true` the caller owns one concurrency slot and must call
    /// [`release`](Self::release) exactly once when the request finishes.
    pub fn allow(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock();

        let state = clients
            .entry(client.to_owned())
            .or_insert_with(|| RateState::full(self.config.capacity(), now));

        if state.in_flight >= self.config.max_concurrent {
            debug!(client, in_flight = state.in_flight, "Concurrency limit reached");
            return false;
        }

        state.refill(&self.config, now);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            state.in_flight += 1;
            true
        } else {
            debug!(client, "Rate limit reached");
            false
        }
    }

    /// Return a concurrency slot taken by a successful [`allow`](Self::allow)
    pub fn release(&self, client: &str) {
        let mut clients = self.clients.lock();

        if let Some(state) = clients.get_mut(client) {
            state.in_flight = state.in_flight.saturating_sub(1);
        }
    }

    /// Admit a request and tie the matching release to the returned permit
    pub fn try_acquire(self: &Arc<Self>, client: &str) -> Option<AdmissionPermit> {
        self.allow(client).then(|| AdmissionPermit {
            limiter: Arc::clone(self),
            client: client.to_owned(),
        })
    }

    /// Un-released admissions currently held by `client`
    pub fn in_flight(&self, client: &str) -> u32 {
        self.clients
            .lock()
            .get(client)
            .map(|state| state.in_flight)
            .unwrap_or(0)
    }

    /// Number of distinct clients seen so far
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }
}

impl fmt::Debug for TokenBucketLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBucketLimiter")
            .field("config", &self.config)
            .field("tracked_clients", &self.tracked_clients())
            .finish()
    }
}

/// One admitted request; releases its concurrency slot on drop
#[derive(Debug)]
#[must_use = "dropping the permit releases the slot immediately"]
pub struct AdmissionPermit {
    limiter: Arc<TokenBucketLimiter>,
    client: String,
}

impl AdmissionPermit {
    pub fn client(&self) -> &str {
        &self.client
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.limiter.release(&self.client);
    }
}
