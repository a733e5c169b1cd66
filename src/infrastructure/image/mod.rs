//! Image storage infrastructure

mod fs_repository;
mod service;

pub use fs_repository::FsImageRepository;
pub use service::{ImageService, ListingCache};
