//! Recipe-Harvester: a resumable recipe crawler
//!
//! This crate crawls a recipe site from a seed URL, keeps a persistent frontier of
//! every URL it has seen, and saves each page the site collaborator recognises as a
//! recipe. Saved recipes can later have their images downloaded and cropped.

pub mod config;
pub mod crawler;
pub mod images;
pub mod model;
pub mod output;
pub mod sites;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Recipe-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Image error: {0}")]
    Image(#[from] images::ImageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Not a recipe: {url} ({reason})")]
    NotDocument { url: String, reason: String },

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No site registered for domain: {0}")]
    UnknownSite(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Recipe-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use model::Recipe;
pub use state::JobStatus;
pub use crate::url::{parse_seed_url, site_domain};
