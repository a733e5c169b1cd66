//! API key authentication

use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, HeaderMap, Uri},
};
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Extractor that requires a currently usable API key
///
/// The key is read from the `X-API-Key` header, or from the `api_key` query
/// parameter when the header is absent. Unknown, expired and revoked keys
/// all produce the same rejection.
#[derive(Debug, Clone)]
pub struct RequireApiKey {
    pub label: String,
}

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = extract_api_key(&parts.headers, &parts.uri)
            .ok_or_else(|| ApiError::unauthorized("missing API key"))?;

        if !state.api_keys.validate_key(&key) {
            debug!("API key rejected");
            return Err(ApiError::unauthorized("invalid or expired API key"));
        }

        let label = state
            .api_keys
            .key_info(&key)
            .map(|info| info.label)
            .unwrap_or_default();

        Ok(RequireApiKey { label })
    }
}

fn extract_api_key(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_header = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if let Some(key) = from_header {
        return Some(key.to_string());
    }

    Query::<ApiKeyQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.api_key)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}
