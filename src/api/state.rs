//! Application state shared by handlers and middleware

use std::sync::Arc;

use crate::infrastructure::api_key::ApiKeyStore;
use crate::infrastructure::auth::{TokenIssuer, UserDirectory};
use crate::infrastructure::image::{ImageService, ListingCache};
use crate::infrastructure::rate_limit::TokenBucketLimiter;

/// Handles to the long-lived components
///
/// Every field is reference counted so cloning the state per request is cheap.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: Arc<ListingCache>,
    pub limiter: Arc<TokenBucketLimiter>,
    pub api_keys: Arc<ApiKeyStore>,
    pub tokens: Arc<TokenIssuer>,
    pub users: Arc<UserDirectory>,
    pub images: Arc<ImageService>,
    /// Key admission on proxy headers instead of the socket peer
    pub trust_forwarded_headers: bool,
}
