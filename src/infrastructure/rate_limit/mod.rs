//! Request admission control

mod token_bucket;

pub use token_bucket::{AdmissionPermit, RateLimitConfig, TokenBucketLimiter};
