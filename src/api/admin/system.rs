//! Runtime statistics and cache control

use axum::extract::State;
use serde::Serialize;
use tracing::info;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::Json;

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cache_entries: usize,
    pub rate_limited_clients: usize,
    pub api_keys: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub cleared: usize,
}

/// GET /admin/stats
pub async fn stats(State(state): State<AppState>, _admin: RequireAdmin) -> Json<StatsResponse> {
    Json(StatsResponse {
        cache_entries: state.cache.size(),
        rate_limited_clients: state.limiter.tracked_clients(),
        api_keys: state.api_keys.len(),
    })
}

/// POST /admin/cache/clear
pub async fn clear_cache(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Json<ClearCacheResponse> {
    let cleared = state.cache.size();
    state.cache.clear();

    info!(admin = %admin.sub, cleared, "Cache cleared");

    Json(ClearCacheResponse { cleared })
}
