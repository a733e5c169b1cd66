//! Request admission and authentication

pub mod auth;
pub mod rate_limit;
pub mod user_auth;

pub use auth::RequireApiKey;
pub use rate_limit::{admission_middleware, client_address, AdmissionControl};
pub use user_auth::{extract_bearer_token, RequireAdmin, RequireUser, ADMIN_ROLE};
