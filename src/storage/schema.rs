//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Recipe-Harvester database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per URL ever discovered
CREATE TABLE IF NOT EXISTS crawl_jobs (
    url TEXT PRIMARY KEY NOT NULL,
    site_id TEXT NOT NULL,
    status TEXT NOT NULL,
    discovered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_jobs_site_status ON crawl_jobs(site_id, status);

-- Saved documents, one per URL classified as a recipe
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_id TEXT NOT NULL,
    source_url TEXT NOT NULL,
    payload TEXT NOT NULL,
    saved_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_site ON documents(site_id, id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
