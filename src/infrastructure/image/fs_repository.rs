//! File-system image repository

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;

use crate::domain::image::{is_allowed_content_type, ImageEntry, ImageRepository};
use crate::domain::DomainError;

/// Reads image files from a directory on local disk
#[derive(Debug, Clone, Default)]
pub struct FsImageRepository;

impl FsImageRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageRepository for FsImageRepository {
    async fn list(&self, dir: &Path) -> Result<Vec<ImageEntry>, DomainError> {
        let mut read_dir = match fs::read_dir(dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    dir.display(),
                    e
                )))
            }
        };

        let mut images = Vec::new();

        while let Some(entry) = read_dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let path = entry.path();
            let Some(mime) = mime_guess::from_path(&path).first() else {
                continue;
            };

            if !is_allowed_content_type(mime.essence_str()) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let mut image = ImageEntry::new(name, metadata.len(), mime.essence_str());

            if let Ok(modified) = metadata.modified() {
                image = image.with_modified_at(DateTime::<Utc>::from(modified));
            }

            images.push(image);
        }

        images.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_only_images_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"png").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"jpeg!").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let images = FsImageRepository::new().list(dir.path()).await.unwrap();

        let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
        assert_eq!(images[0].size, 5);
        assert_eq!(images[0].content_type, "image/jpeg");
        assert!(images[0].modified_at.is_some());
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();

        let images = FsImageRepository::new()
            .list(&dir.path().join("does-not-exist"))
            .await
            .unwrap();

        assert!(images.is_empty());
    }
}
