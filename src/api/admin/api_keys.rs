//! API key management endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::ApiKeyInfo;

const DEFAULT_EXPIRE_AFTER_DAYS: u32 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKeyRequest {
    pub label: String,
    #[serde(default = "default_expire_after_days")]
    pub expire_after_days: u32,
}

fn default_expire_after_days() -> u32 {
    DEFAULT_EXPIRE_AFTER_DAYS
}

/// Returned once at creation; the plaintext is not stored
#[derive(Debug, Clone, Serialize)]
pub struct CreateApiKeyResponse {
    pub key: String,
    #[serde(flatten)]
    pub info: ApiKeyInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevokeApiKeyRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevokeApiKeyResponse {
    pub revoked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListApiKeysResponse {
    pub keys: Vec<ApiKeyInfo>,
    pub total: usize,
}

/// POST /admin/api-keys
pub async fn create_api_key(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<Json<CreateApiKeyResponse>, ApiError> {
    let label = request.label.trim();
    if label.is_empty() {
        return Err(ApiError::bad_request("label must not be empty"));
    }

    let key = state.api_keys.create_key(label, request.expire_after_days);
    let info = state
        .api_keys
        .key_info(&key)
        .ok_or_else(|| ApiError::internal("created key is missing from the store"))?;

    info!(admin = %admin.sub, label, "API key issued");

    Ok(Json(CreateApiKeyResponse { key, info }))
}

/// GET /admin/api-keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Json<ListApiKeysResponse> {
    let keys = state.api_keys.list_keys();

    Json(ListApiKeysResponse {
        total: keys.len(),
        keys,
    })
}

/// POST /admin/api-keys/revoke
pub async fn revoke_api_key(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<RevokeApiKeyRequest>,
) -> Result<Json<RevokeApiKeyResponse>, ApiError> {
    if !state.api_keys.revoke_key(request.key.trim()) {
        return Err(ApiError::not_found("API key not found"));
    }

    info!(admin = %admin.sub, "API key revoked");

    Ok(Json(RevokeApiKeyResponse { revoked: true }))
}
