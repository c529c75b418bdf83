//! Storage traits and error types
//!
//! This module defines the trait interface for frontier store backends and
//! associated error types.

use crate::state::JobStatus;
use crate::storage::{CrawlJob, SavedDocument};
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// Any of these aborts a crawl run.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Lazy sequence of saved documents
pub type DocumentIter<'a> = Box<dyn Iterator<Item = StorageResult<SavedDocument>> + 'a>;

/// Trait for frontier store backends
///
/// Each mutating operation is a single atomic unit. Implementations rely on the
/// database to serialize concurrent writers; callers that run concurrently each
/// hold their own handle obtained through [`FrontierStore::reopen`].
pub trait FrontierStore: Send {
    /// Opens another handle onto the same underlying database
    fn reopen(&self) -> StorageResult<Self>
    where
        Self: Sized;

    // ===== Frontier =====

    /// Inserts `url` as TODO unless it is already known
    fn seed(&mut self, site_id: &str, url: &str) -> StorageResult<()>;

    /// Moves every IN_PROGRESS job of the site back to TODO
    ///
    /// Used once at start-up to reclaim URLs stranded by an aborted run.
    ///
    /// # Returns
    ///
    /// The number of jobs requeued
    fn requeue_in_progress(&mut self, site_id: &str) -> StorageResult<usize>;

    /// Claims up to `limit` TODO URLs, moving them to IN_PROGRESS
    ///
    /// Selection order is store-defined. A single claimer is assumed.
    fn claim(&mut self, site_id: &str, limit: usize) -> StorageResult<Vec<String>>;

    /// Saves a document and marks its URL DONE in one transaction
    ///
    /// # Returns
    ///
    /// The id assigned to the saved document
    fn record_document(&mut self, site_id: &str, url: &str, payload: &str)
        -> StorageResult<i64>;

    /// Marks `source_url` DONE and inserts each discovered URL as TODO
    ///
    /// URLs that already have a row are left untouched. An empty or unknown
    /// `source_url` only inserts.
    ///
    /// # Returns
    ///
    /// The number of URLs that were new to the frontier
    fn record_discovery(
        &mut self,
        site_id: &str,
        source_url: &str,
        discovered: &[String],
    ) -> StorageResult<usize>;

    // ===== Queries =====

    /// Counts TODO jobs for a site
    fn count_todo(&self, site_id: &str) -> StorageResult<u64> {
        self.count_by_status(site_id, JobStatus::Todo)
    }

    /// Returns true when the site has no TODO jobs left
    fn is_empty(&self, site_id: &str) -> StorageResult<bool> {
        Ok(self.count_todo(site_id)? == 0)
    }

    /// Counts jobs of a site in the given status
    fn count_by_status(&self, site_id: &str, status: JobStatus) -> StorageResult<u64>;

    /// Gets a job by URL
    fn get_job(&self, url: &str) -> StorageResult<Option<CrawlJob>>;

    /// Gets the status of a URL, if it is known
    fn status_of(&self, url: &str) -> StorageResult<Option<JobStatus>> {
        Ok(self.get_job(url)?.map(|job| job.status))
    }

    /// Counts all jobs of a site
    fn count_jobs(&self, site_id: &str) -> StorageResult<u64>;

    /// Counts saved documents of a site
    fn count_documents(&self, site_id: &str) -> StorageResult<u64>;

    /// Lists every site id that has jobs or documents, sorted
    fn site_ids(&self) -> StorageResult<Vec<String>>;

    // ===== Documents =====

    /// Iterates over the saved documents of a site in id order
    ///
    /// Rows are fetched lazily; every call starts again from the first document.
    fn all_documents<'a>(&'a self, site_id: &str) -> StorageResult<DocumentIter<'a>>;
}
