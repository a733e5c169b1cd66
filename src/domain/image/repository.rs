//! Image repository trait

use std::path::Path;

use async_trait::async_trait;

use super::ImageEntry;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Read access to stored images
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Lists the images stored directly under `dir`, sorted by name
    async fn list(&self, dir: &Path) -> Result<Vec<ImageEntry>, DomainError>;
}
