//! Administrative endpoints, all restricted to the admin role

pub mod api_keys;
pub mod system;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/api-keys", get(api_keys::list_api_keys))
        .route("/api-keys", post(api_keys::create_api_key))
        .route("/api-keys/revoke", post(api_keys::revoke_api_key))
        .route("/stats", get(system::stats))
        .route("/cache/clear", post(system::clear_cache))
}
