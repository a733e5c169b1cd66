//! Image listing service
//!
//! Cache-aside over the image repository: the cache only saves directory
//! scans, a miss always falls through to the repository.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::image::{ImageEntry, ImageRepository};
use crate::domain::DomainError;
use crate::infrastructure::cache::TtlCache;

/// Cache holding directory listings
pub type ListingCache = TtlCache<String, Arc<Vec<ImageEntry>>>;

pub struct ImageService {
    repository: Arc<dyn ImageRepository>,
    cache: Arc<ListingCache>,
    upload_dir: PathBuf,
    listing_ttl: Duration,
}

impl ImageService {
    pub fn new(
        repository: Arc<dyn ImageRepository>,
        cache: Arc<ListingCache>,
        upload_dir: impl Into<PathBuf>,
        listing_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            upload_dir: upload_dir.into(),
            listing_ttl,
        }
    }

    fn cache_key(&self) -> String {
        format!("images:{}", self.upload_dir.display())
    }

    /// List stored images, served from cache while the listing is fresh
    pub async fn list(&self) -> Result<Arc<Vec<ImageEntry>>, DomainError> {
        let key = self.cache_key();

        if let Some(images) = self.cache.get(&key) {
            debug!(count = images.len(), "Image listing served from cache");
            return Ok(images);
        }

        let images = Arc::new(self.repository.list(&self.upload_dir).await?);
        self.cache.set(key, images.clone(), self.listing_ttl);

        debug!(count = images.len(), "Image listing refreshed");
        Ok(images)
    }

}

impl std::fmt::Debug for ImageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageService")
            .field("upload_dir", &self.upload_dir)
            .field("listing_ttl", &self.listing_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::MockImageRepository;

    fn service(mock: MockImageRepository, ttl: Duration) -> (ImageService, Arc<ListingCache>) {
        let cache = Arc::new(ListingCache::new());
        let service = ImageService::new(Arc::new(mock), cache.clone(), "/srv/files", ttl);
        (service, cache)
    }

    #[tokio::test]
    async fn test_second_list_is_served_from_cache() {
        let mut mock = MockImageRepository::new();
        mock.expect_list()
            .times(1)
            .returning(|_| Ok(vec![ImageEntry::new("cat.png", 10, "image/png")]));

        let (service, cache) = service(mock, Duration::from_secs(60));

        let first = service.list().await.unwrap();
        let second = service.list().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second[0].name, "cat.png");
        assert_eq!(cache.size(), 1);
    }

    #[tokio::test]
    async fn test_expired_listing_is_reloaded() {
        let mut mock = MockImageRepository::new();
        mock.expect_list().times(2).returning(|_| Ok(Vec::new()));

        let (service, _cache) = service(mock, Duration::ZERO);

        service.list().await.unwrap();
        service.list().await.unwrap();
    }

    #[tokio::test]
    async fn test_repository_error_is_not_cached() {
        let mut mock = MockImageRepository::new();
        mock.expect_list()
            .times(1)
            .returning(|_| Err(DomainError::storage("disk gone")));

        let (service, cache) = service(mock, Duration::from_secs(60));

        assert!(service.list().await.is_err());
        assert_eq!(cache.size(), 0);
    }
}
