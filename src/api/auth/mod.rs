//! Login and token endpoints

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::middleware::{extract_bearer_token, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(get_current_user))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub issued_at: String,
    pub expires_at: String,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let account = state
        .users
        .authenticate(&request.username, &request.password)
        .ok_or_else(|| {
            debug!(username = %request.username, "Login failed");
            ApiError::unauthorized("invalid username or password")
        })?;

    let token = state
        .tokens
        .generate_token(&account.user_id, &account.username, &account.role)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!(user_id = %account.user_id, "User logged in");

    Ok(Json(LoginResponse {
        expires_at: signed_expiry(&state, &token)?,
        token,
        user: UserResponse {
            user_id: account.user_id.clone(),
            username: account.username.clone(),
            role: account.role.clone(),
        },
    }))
}

/// POST /auth/refresh
///
/// Only a currently valid token can be refreshed.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = extract_bearer_token(&headers)?;

    let token = state.tokens.refresh_token(&token).map_err(|e| {
        debug!(reason = %e, "Token refresh rejected");
        ApiError::unauthorized("failed to refresh token")
    })?;

    Ok(Json(TokenResponse {
        expires_at: signed_expiry(&state, &token)?,
        token,
    }))
}

/// GET /auth/me
pub async fn get_current_user(RequireUser(claims): RequireUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        issued_at: unix_to_rfc3339(claims.iat),
        expires_at: claims.expires_at().to_rfc3339(),
        user: UserResponse {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        },
    })
}

/// The `exp` claim of a token this server just signed
fn signed_expiry(state: &AppState, token: &str) -> Result<String, ApiError> {
    state
        .tokens
        .validate_token(token)
        .map(|claims| claims.expires_at().to_rfc3339())
        .map_err(|e| ApiError::internal(e.to_string()))
}

fn unix_to_rfc3339(secs: i64) -> String {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_default()
}
