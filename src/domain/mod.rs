//! Domain layer - Core entities, errors and repository traits

pub mod api_key;
pub mod error;
pub mod image;

pub use api_key::{ApiKeyInfo, ApiKeyRecord, KeyStatus};
pub use error::DomainError;
pub use image::{ImageEntry, ImageRepository};
