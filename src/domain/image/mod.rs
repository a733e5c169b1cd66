//! Image domain - stored image files and their listing

mod entity;
mod repository;

pub use entity::{is_allowed_content_type, ImageEntry, ALLOWED_CONTENT_TYPES};
pub use repository::ImageRepository;

#[cfg(test)]
pub use repository::MockImageRepository;
