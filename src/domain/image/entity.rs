//! Image entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME types accepted by the image server
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// A stored image file as seen in a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub modified_at: Option<DateTime<Utc>>,
}

impl ImageEntry {
    pub fn new(name: impl Into<String>, size: u64, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: content_type.into(),
            modified_at: None,
        }
    }

    pub fn with_modified_at(mut self, modified_at: DateTime<Utc>) -> Self {
        self.modified_at = Some(modified_at);
        self
    }
}

/// Check whether a MIME type is one the server lists and serves
pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_content_types() {
        assert!(is_allowed_content_type("image/png"));
        assert!(is_allowed_content_type("image/webp"));
        assert!(!is_allowed_content_type("image/svg+xml"));
        assert!(!is_allowed_content_type("text/plain"));
    }

    #[test]
    fn test_entry_serialization() {
        let entry = ImageEntry::new("cat.png", 42, "image/png");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["name"], "cat.png");
        assert_eq!(json["size"], 42);
        assert!(json["modified_at"].is_null());
    }
}
