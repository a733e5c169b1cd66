//! Infrastructure layer - in-memory state managers, storage and logging

pub mod api_key;
pub mod auth;
pub mod cache;
pub mod image;
pub mod logging;
pub mod rate_limit;
pub mod sweeper;

pub use api_key::{ApiKeyGenerator, ApiKeyStore};
pub use auth::{JwtConfig, TokenClaims, TokenError, TokenIssuer, UserDirectory};
pub use cache::TtlCache;
pub use rate_limit::{AdmissionPermit, RateLimitConfig, TokenBucketLimiter};
pub use sweeper::{spawn_sweeper, Sweep, SweeperHandle};
