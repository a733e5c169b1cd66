use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::admin;
use super::auth;
use super::health;
use super::images;
use super::middleware::{admission_middleware, AdmissionControl};
use super::state::AppState;

/// Create the full router with application state
///
/// Admission control wraps every route, including health probes.
pub fn create_router(state: AppState) -> Router {
    let admission = AdmissionControl::new(state.limiter.clone(), state.trust_forwarded_headers);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest("/auth", auth::create_auth_router())
        .route("/api/images", get(images::list_images))
        .nest("/admin", admin::create_admin_router())
        .layer(middleware::from_fn_with_state(admission, admission_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
