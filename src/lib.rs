//! Image Server
//!
//! Image listing API built around a set of in-process state managers:
//! - TTL cache for directory listings
//! - Per-client token-bucket admission with a concurrency cap
//! - API key issuance, validation and revocation
//! - Signed login tokens with refresh

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use api::state::AppState;
use domain::DomainError;
use infrastructure::{
    api_key::{ApiKeyGenerator, ApiKeyStore},
    auth::{JwtConfig, TokenIssuer, UserDirectory},
    image::{FsImageRepository, ImageService, ListingCache},
    rate_limit::TokenBucketLimiter,
    sweeper::{spawn_sweeper, SweeperHandle},
};

/// Build every shared component from configuration
///
/// Configured seed keys are registered before the state is returned.
pub fn create_app_state(config: &AppConfig) -> Result<AppState, DomainError> {
    let cache = Arc::new(ListingCache::named("listing_cache"));
    let limiter = Arc::new(TokenBucketLimiter::new(config.rate_limit)?);

    let api_keys = Arc::new(ApiKeyStore::new(ApiKeyGenerator::new(
        config.api_keys.key_prefix.as_str(),
    )));
    for seed in &config.api_keys.seed_keys {
        api_keys.create_key_with_secret(&seed.label, &seed.secret, seed.expire_after_days);
    }

    if config.auth.uses_default_secret() {
        warn!("JWT secret is the built-in development value; set APP__AUTH__JWT_SECRET");
    }
    let tokens = Arc::new(TokenIssuer::new(JwtConfig::new(
        config.auth.jwt_secret.as_str(),
        config.auth.token_ttl_hours,
    )));

    if config.auth.users.is_empty() {
        warn!("No login accounts configured; token login is disabled");
    }
    let users = Arc::new(UserDirectory::new(config.auth.users.clone()));

    let images = Arc::new(ImageService::new(
        Arc::new(FsImageRepository::new()),
        cache.clone(),
        config.storage.upload_dir.clone(),
        config.cache.listing_ttl(),
    ));

    info!(
        seed_keys = config.api_keys.seed_keys.len(),
        users = users.len(),
        requests_per_second = config.rate_limit.requests_per_second,
        max_concurrent = config.rate_limit.max_concurrent,
        "Application state initialized"
    );

    Ok(AppState {
        cache,
        limiter,
        api_keys,
        tokens,
        users,
        images,
        trust_forwarded_headers: config.server.trust_forwarded_headers,
    })
}

/// Owner of the periodic sweep tasks
#[derive(Debug, Default)]
pub struct BackgroundTasks {
    handles: Vec<SweeperHandle>,
}

impl BackgroundTasks {
    /// Start the cache and API key sweepers
    pub fn start(state: &AppState, config: &AppConfig) -> Self {
        let handles = vec![
            spawn_sweeper(state.cache.clone(), config.cache.sweep_interval()),
            spawn_sweeper(state.api_keys.clone(), config.api_keys.sweep_interval()),
        ];

        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Signal every sweeper and wait for it to finish
    pub async fn shutdown(self) {
        for handle in self.handles {
            handle.shutdown().await;
        }
    }
}
