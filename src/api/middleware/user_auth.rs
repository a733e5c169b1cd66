//! Bearer token authentication

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::auth::TokenClaims;

pub const ADMIN_ROLE: &str = "admin";

/// Extractor that requires a valid bearer token
///
/// Every validation failure maps to the same 401 body.
#[derive(Debug, Clone)]
pub struct RequireUser(pub TokenClaims);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        let claims = state.tokens.validate_token(&token).map_err(|e| {
            debug!(reason = %e, "Bearer token rejected");
            ApiError::unauthorized("invalid or expired token")
        })?;

        Ok(RequireUser(claims))
    }
}

/// Extractor that requires a valid bearer token carrying the admin role
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub TokenClaims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(claims) = RequireUser::from_request_parts(parts, state).await?;

        if claims.role != ADMIN_ROLE {
            debug!(subject = %claims.sub, role = %claims.role, "Admin access denied");
            return Err(ApiError::forbidden("admin access required"));
        }

        Ok(RequireAdmin(claims))
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("invalid or expired token"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::unauthorized("invalid or expired token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer eyJhbGciOiJIUzI1NiJ9.test".parse().unwrap(),
        );

        assert_eq!(
            extract_bearer_token(&headers).unwrap(),
            "eyJhbGciOiJIUzI1NiJ9.test"
        );
    }

    #[test]
    fn test_missing_header() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.response.error.message, "missing authorization header");
    }

    #[test]
    fn test_non_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_non_utf8_header_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            axum::http::HeaderValue::from_bytes(b"Bearer \xff").unwrap(),
        );

        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.response.error.message, "invalid or expired token");
    }

    #[test]
    fn test_empty_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer   ".parse().unwrap());

        assert!(extract_bearer_token(&headers).is_err());
    }
}
