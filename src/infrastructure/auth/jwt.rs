//! Signed, stateless identity tokens
//!
//! Tokens are HS256 JWTs. Validity depends only on the signature and the
//! embedded `nbf`/`exp` window; there is no server-side record or revocation
//! list, so a leaked token stays valid until it expires.

use std::fmt::Debug;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name
    pub username: String,
    pub role: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Not valid before (Unix epoch)
    pub nbf: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl TokenClaims {
    fn new(
        subject_id: &str,
        username: &str,
        role: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: subject_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Why a token was rejected
///
/// Callers answering a client must collapse all of these into one
/// "invalid token" response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature does not match")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidSignature => Self::SignatureInvalid,
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Configuration for the token issuer
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// How long an issued token stays valid
    pub ttl: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(expiration_hours.min(i32::MAX as u64) as i64),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_JWT_SECRET, 24)
    }
}

/// Mints, validates and refreshes signed tokens with a server-held secret
#[derive(Clone)]
pub struct TokenIssuer {
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);

        Self {
            ttl: config.ttl,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Issue a token valid from now for the configured duration
    pub fn generate_token(
        &self,
        subject_id: &str,
        username: &str,
        role: &str,
    ) -> Result<String, TokenError> {
        self.issue_at(subject_id, username, role, Utc::now())
    }

    fn issue_at(
        &self,
        subject_id: &str,
        username: &str,
        role: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims::new(subject_id, username, role, issued_at, self.ttl);
        self.sign(&claims)
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify the signature and that now lies within `[nbf, exp]`
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                let err = TokenError::from(e);
                debug!("Token rejected: {}", err);
                err
            })?;

        Ok(token_data.claims)
    }

    /// Re-issue a currently valid token with the same identity and a new window
    ///
    /// Expired or otherwise invalid tokens are not refreshed.
    pub fn refresh_token(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.validate_token(token)?;

        self.generate_token(&claims.sub, &claims.username, &claims.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_issuer() -> TokenIssuer {
        TokenIssuer::new(JwtConfig::new("test-secret-key-12345", 24))
    }

    #[test]
    fn test_generate_and_validate() {
        let issuer = create_issuer();

        let token = issuer.generate_token("1", "admin", "admin").unwrap();
        let claims = issuer.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "1");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(claims.expires_at() > Utc::now());
    }

    #[test]
    fn test_invalid_token() {
        let issuer = create_issuer();

        assert!(matches!(
            issuer.validate_token("invalid-token"),
            Err(TokenError::Malformed(_))
        ));
        assert!(issuer.validate_token("").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let issuer1 = TokenIssuer::new(JwtConfig::new("secret-1", 24));
        let issuer2 = TokenIssuer::new(JwtConfig::new("secret-2", 24));

        let token = issuer1.generate_token("1", "admin", "admin").unwrap();

        assert_eq!(
            issuer2.validate_token(&token),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_any_flipped_character_is_rejected() {
        let issuer = create_issuer();
        let token = issuer.generate_token("2", "user", "user").unwrap();

        for (i, c) in token.char_indices() {
            if c == '.' {
                continue;
            }

            let replacement = if c == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(i..i + 1, &replacement.to_string());

            assert!(
                issuer.validate_token(&tampered).is_err(),
                "tampered token accepted at position {}",
                i
            );
        }
    }

    #[test]
    fn test_expired_token() {
        let issuer = create_issuer();
        let issued_at = Utc::now() - Duration::hours(25);

        let token = issuer.issue_at("1", "admin", "admin", issued_at).unwrap();

        assert_eq!(issuer.validate_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_not_yet_valid_token() {
        let issuer = create_issuer();
        let now = Utc::now();

        let mut claims = TokenClaims::new("1", "admin", "admin", now, Duration::hours(1));
        claims.nbf = (now + Duration::minutes(10)).timestamp();
        let token = issuer.sign(&claims).unwrap();

        assert_eq!(issuer.validate_token(&token), Err(TokenError::NotYetValid));
    }

    #[test]
    fn test_refresh_extends_expiry() {
        let issuer = create_issuer();
        let issued_at = Utc::now() - Duration::minutes(10);

        let original = issuer.issue_at("2", "user", "user", issued_at).unwrap();
        let before = issuer.validate_token(&original).unwrap();

        let refreshed = issuer.refresh_token(&original).unwrap();
        let after = issuer.validate_token(&refreshed).unwrap();

        assert_eq!(after.sub, before.sub);
        assert_eq!(after.username, before.username);
        assert_eq!(after.role, before.role);
        assert!(after.exp > before.exp);
        assert!(after.iat > before.iat);
    }

    #[test]
    fn test_refresh_rejects_expired_token() {
        let issuer = create_issuer();
        let token = issuer
            .issue_at("2", "user", "user", Utc::now() - Duration::days(2))
            .unwrap();

        assert_eq!(issuer.refresh_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_refresh_rejects_corrupted_token() {
        let issuer = create_issuer();
        let token = issuer.generate_token("2", "user", "user").unwrap();
        let corrupted = format!("{}x", token);

        assert!(issuer.refresh_token(&corrupted).is_err());
    }

    #[test]
    fn test_custom_ttl() {
        let issuer = TokenIssuer::new(JwtConfig {
            ttl: Duration::minutes(5),
            ..JwtConfig::default()
        });

        let token = issuer.generate_token("3", "ops", "user").unwrap();
        let claims = issuer.validate_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 300);
    }
}
