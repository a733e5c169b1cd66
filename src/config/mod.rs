//! Application configuration

mod app_config;

pub use app_config::{
    ApiKeysConfig, AppConfig, AuthConfig, CacheConfig, LogFormat, LoggingConfig, SeedKey,
    ServerConfig, StorageConfig, DEFAULT_JWT_SECRET,
};
