//! Image utilities for saved recipes
//!
//! Both utilities run after a crawl and only read what the crawl persisted:
//! - [`ImageDownloader`] fetches the photos referenced by saved recipes
//! - [`crop_square_all`] turns downloaded photos into centred square PNGs

mod crop;
mod download;

pub use crop::{crop_square, crop_square_all};
pub use download::{image_file_name, DownloadReport, ImageDownloader};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors raised by the image utilities
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
