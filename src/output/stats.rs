//! Statistics generation from the frontier database
//!
//! This module provides functionality for extracting and displaying
//! per-site crawl statistics from the storage layer.

use crate::state::JobStatus;
use crate::storage::{FrontierStore, StorageResult};
use std::collections::HashMap;

/// Statistics of one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteStatistics {
    /// Site id
    pub site_id: String,

    /// Total number of URLs known to the frontier
    pub total_jobs: u64,

    /// Count of URLs by status
    pub jobs_by_status: HashMap<JobStatus, u64>,

    /// Number of saved recipes
    pub documents: u64,
}

impl SiteStatistics {
    /// Count for one status, zero when absent
    pub fn count(&self, status: JobStatus) -> u64 {
        self.jobs_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Crawl statistics summary, one entry per site
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    pub sites: Vec<SiteStatistics>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The store to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn FrontierStore) -> StorageResult<CrawlStatistics> {
    let mut sites = Vec::new();

    for site_id in storage.site_ids()? {
        let mut jobs_by_status = HashMap::new();
        for status in JobStatus::all_statuses() {
            let count = storage.count_by_status(&site_id, status)?;
            if count > 0 {
                jobs_by_status.insert(status, count);
            }
        }

        sites.push(SiteStatistics {
            total_jobs: storage.count_jobs(&site_id)?,
            documents: storage.count_documents(&site_id)?,
            jobs_by_status,
            site_id,
        });
    }

    Ok(CrawlStatistics { sites })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    if stats.sites.is_empty() {
        println!("Nothing crawled yet.");
        return;
    }

    for site in &stats.sites {
        println!("{}:", site.site_id);
        println!("  URLs known: {}", site.total_jobs);

        for status in JobStatus::all_statuses() {
            let count = site.count(status);
            let percentage = if site.total_jobs > 0 {
                (count as f64 / site.total_jobs as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", status, count, percentage);
        }

        println!("  Recipes saved: {}", site.documents);
        println!();
    }
}
