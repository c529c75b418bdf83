//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - The crawl frontier (URL → TODO / IN_PROGRESS / DONE)
//! - Saved documents and lazy iteration over them
//! - Crash recovery of URLs stranded IN_PROGRESS

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{DocumentCursor, SqliteStore};
pub use traits::{DocumentIter, FrontierStore, StorageError, StorageResult};

use crate::state::JobStatus;
use serde::de::DeserializeOwned;

use std::path::Path;

/// Opens (creating if needed) a store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully opened store
/// * `Err(StorageError)` - Failed to open or initialize the database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::open(path)
}

/// Represents a frontier row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub url: String,
    pub site_id: String,
    pub status: JobStatus,
    pub discovered_at: String,
}

/// Represents a saved document row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocument {
    pub id: i64,
    pub site_id: String,
    pub source_url: String,
    /// Serialized document; the frontier never looks inside it
    pub payload: String,
    pub saved_at: String,
}

impl SavedDocument {
    /// Deserializes the JSON payload into a concrete document type
    pub fn decode<T: DeserializeOwned>(&self) -> StorageResult<T> {
        serde_json::from_str(&self.payload).map_err(|e| {
            StorageError::Serialization(format!("document {}: {}", self.id, e))
        })
    }
}
