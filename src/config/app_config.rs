use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::auth::{UserAccount, UserDirectory};
use crate::infrastructure::rate_limit::RateLimitConfig;

/// Signing secret used when none is configured
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub api_keys: ApiKeysConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Honour `X-Forwarded-For` / `X-Real-IP`; disable unless behind a proxy
    pub trust_forwarded_headers: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: u64,
    pub users: Vec<UserAccount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub sweep_interval_secs: u64,
    pub listing_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiKeysConfig {
    pub sweep_interval_secs: u64,
    pub key_prefix: String,
    pub seed_keys: Vec<SeedKey>,
}

/// A well-known key registered at startup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedKey {
    pub label: String,
    pub secret: String,
    pub expire_after_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3128,
            trust_forwarded_headers: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            users: UserDirectory::development().accounts().to_vec(),
        }
    }
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 60,
            listing_ttl_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn listing_ttl(&self) -> Duration {
        Duration::from_secs(self.listing_ttl_secs)
    }
}

impl Default for ApiKeysConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 3600,
            key_prefix: "isk_".to_string(),
            seed_keys: vec![
                SeedKey {
                    label: "demo".to_string(),
                    secret: "demo-key-12345".to_string(),
                    expire_after_days: 30,
                },
                SeedKey {
                    label: "test".to_string(),
                    secret: "test-key-67890".to_string(),
                    expire_after_days: 7,
                },
            ],
        }
    }
}

impl ApiKeysConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./files"),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn from_toml(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 3128);
        assert_eq!(config.rate_limit, RateLimitConfig::new(100, 10));
        assert_eq!(config.cache.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.cache.listing_ttl(), Duration::from_secs(300));
        assert!(config.server.trust_forwarded_headers);
        assert_eq!(config.api_keys.sweep_interval(), Duration::from_secs(3600));
        assert_eq!(config.api_keys.seed_keys.len(), 2);
        assert_eq!(config.auth.users.len(), 2);
        assert!(config.auth.uses_default_secret());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 9000
            trust_forwarded_headers = false

            [rate_limit]
            max_concurrent = 2

            [auth]
            jwt_secret = "s3cret"
            "#,
        );

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.server.trust_forwarded_headers);
        assert_eq!(config.rate_limit.requests_per_second, 100);
        assert_eq!(config.rate_limit.max_concurrent, 2);
        assert!(!config.auth.uses_default_secret());
        assert_eq!(config.auth.token_ttl_hours, 24);
    }

    #[test]
    fn test_seed_keys_and_users() {
        let config = from_toml(
            r#"
            [logging]
            format = "json"

            [api_keys]
            seed_keys = [{ label = "ci", secret = "ci-key", expire_after_days = 1 }]

            [[auth.users]]
            user_id = "9"
            username = "ops"
            password = "pw"
            role = "admin"
            "#,
        );

        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.api_keys.seed_keys[0].secret, "ci-key");
        assert_eq!(config.auth.users.len(), 1);
        assert_eq!(config.auth.users[0].username, "ops");
    }

    #[test]
    fn test_zero_sweep_interval_is_clamped() {
        let config = from_toml("[cache]\nsweep_interval_secs = 0\n");

        assert_eq!(config.cache.sweep_interval(), Duration::from_secs(1));
    }
}
