//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FrontierStore trait.

use crate::state::JobStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DocumentIter, FrontierStore, StorageError, StorageResult};
use crate::storage::{CrawlJob, SavedDocument};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a connection waits for another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Documents fetched per round trip by [`DocumentCursor`]
const DOCUMENT_PAGE_SIZE: usize = 64;

/// SQLite storage backend
///
/// A `SqliteStore` wraps one connection. Tasks that write concurrently each get
/// their own store through [`FrontierStore::reopen`]; SQLite serializes their
/// transactions.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        // WAL lets the orchestrator read while a sink writes
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates an in-memory database (for testing)
    ///
    /// In-memory stores cannot be reopened.
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns a cursor over the site's documents with a custom page size
    pub fn documents_paged(&self, site_id: &str, page_size: usize) -> DocumentCursor<'_> {
        DocumentCursor::new(&self.conn, site_id, page_size)
    }
}

fn map_job(row: &Row<'_>) -> rusqlite::Result<CrawlJob> {
    Ok(CrawlJob {
        url: row.get(0)?,
        site_id: row.get(1)?,
        // Unknown strings can only come from a foreign writer; treat them as pending
        status: JobStatus::from_db_string(&row.get::<_, String>(2)?).unwrap_or(JobStatus::Todo),
        discovered_at: row.get(3)?,
    })
}

fn map_document(row: &Row<'_>) -> rusqlite::Result<SavedDocument> {
    Ok(SavedDocument {
        id: row.get(0)?,
        site_id: row.get(1)?,
        source_url: row.get(2)?,
        payload: row.get(3)?,
        saved_at: row.get(4)?,
    })
}

impl FrontierStore for SqliteStore {
    fn reopen(&self) -> StorageResult<Self> {
        match &self.path {
            Some(path) => Self::open(path),
            None => Err(StorageError::Database(
                "cannot reopen an in-memory database".to_string(),
            )),
        }
    }

    // ===== Frontier =====

    fn seed(&mut self, site_id: &str, url: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_jobs (url, site_id, status, discovered_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(url) DO NOTHING",
            params![url, site_id, JobStatus::Todo.to_db_string(), now],
        )?;
        Ok(())
    }

    fn requeue_in_progress(&mut self, site_id: &str) -> StorageResult<usize> {
        let requeued = self.conn.execute(
            "UPDATE crawl_jobs SET status = ?1 WHERE site_id = ?2 AND status = ?3",
            params![
                JobStatus::Todo.to_db_string(),
                site_id,
                JobStatus::InProgress.to_db_string()
            ],
        )?;
        Ok(requeued)
    }

    fn claim(&mut self, site_id: &str, limit: usize) -> StorageResult<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let urls = {
            let mut stmt = tx.prepare(
                "SELECT url FROM crawl_jobs WHERE site_id = ?1 AND status = ?2 LIMIT ?3",
            )?;
            let rows = stmt.query_map(
                params![site_id, JobStatus::Todo.to_db_string(), limit as i64],
                |row| row.get::<_, String>(0),
            )?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        {
            let mut update =
                tx.prepare("UPDATE crawl_jobs SET status = ?1 WHERE url = ?2 AND status = ?3")?;
            for url in &urls {
                update.execute(params![
                    JobStatus::InProgress.to_db_string(),
                    url,
                    JobStatus::Todo.to_db_string()
                ])?;
            }
        }

        tx.commit()?;
        Ok(urls)
    }

    fn record_document(
        &mut self,
        site_id: &str,
        url: &str,
        payload: &str,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO documents (site_id, source_url, payload, saved_at) VALUES (?1, ?2, ?3, ?4)",
            params![site_id, url, payload, now],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE crawl_jobs SET status = ?1 WHERE url = ?2 AND site_id = ?3",
            params![JobStatus::Done.to_db_string(), url, site_id],
        )?;

        tx.commit()?;
        Ok(id)
    }

    fn record_discovery(
        &mut self,
        site_id: &str,
        source_url: &str,
        discovered: &[String],
    ) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !source_url.is_empty() {
            tx.execute(
                "UPDATE crawl_jobs SET status = ?1 WHERE url = ?2 AND site_id = ?3",
                params![JobStatus::Done.to_db_string(), source_url, site_id],
            )?;
        }

        let mut inserted = 0;
        {
            let mut insert = tx.prepare(
                "INSERT INTO crawl_jobs (url, site_id, status, discovered_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(url) DO NOTHING",
            )?;
            for url in discovered {
                inserted += insert.execute(params![
                    url,
                    site_id,
                    JobStatus::Todo.to_db_string(),
                    now
                ])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    // ===== Queries =====

    fn count_by_status(&self, site_id: &str, status: JobStatus) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM crawl_jobs WHERE site_id = ?1 AND status = ?2",
            params![site_id, status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn get_job(&self, url: &str) -> StorageResult<Option<CrawlJob>> {
        let job = self
            .conn
            .query_row(
                "SELECT url, site_id, status, discovered_at FROM crawl_jobs WHERE url = ?1",
                params![url],
                map_job,
            )
            .optional()?;
        Ok(job)
    }

    fn count_jobs(&self, site_id: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM crawl_jobs WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_documents(&self, site_id: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn site_ids(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT site_id FROM crawl_jobs
             UNION
             SELECT site_id FROM documents
             ORDER BY site_id",
        )?;

        let sites = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(sites)
    }

    // ===== Documents =====

    fn all_documents<'a>(&'a self, site_id: &str) -> StorageResult<DocumentIter<'a>> {
        Ok(Box::new(self.documents_paged(site_id, DOCUMENT_PAGE_SIZE)))
    }
}

/// Lazy, keyset-paginated iterator over a site's saved documents
///
/// Only one page of rows is held in memory at a time. The cursor ends after the
/// first short page or the first error.
pub struct DocumentCursor<'a> {
    conn: &'a Connection,
    site_id: String,
    last_id: i64,
    page_size: usize,
    buffer: VecDeque<SavedDocument>,
    exhausted: bool,
}

impl<'a> DocumentCursor<'a> {
    fn new(conn: &'a Connection, site_id: &str, page_size: usize) -> Self {
        Self {
            conn,
            site_id: site_id.to_string(),
            last_id: 0,
            page_size: page_size.max(1),
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fill(&mut self) -> StorageResult<()> {
        let conn = self.conn;
        let mut stmt = conn.prepare_cached(
            "SELECT id, site_id, source_url, payload, saved_at FROM documents
             WHERE site_id = ?1 AND id > ?2 ORDER BY id LIMIT ?3",
        )?;

        let rows = stmt.query_map(
            params![self.site_id, self.last_id, self.page_size as i64],
            map_document,
        )?;
        for row in rows {
            self.buffer.push_back(row?);
        }

        if self.buffer.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = self.buffer.back() {
            self.last_id = last.id;
        }

        Ok(())
    }
}

impl Iterator for DocumentCursor<'_> {
    type Item = StorageResult<SavedDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fill() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }

        self.buffer.pop_front().map(Ok)
    }
}
