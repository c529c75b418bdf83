//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - Same-origin link extraction
//! - The fetch worker pool and its two result sinks
//! - Overall crawl orchestration

mod fetcher;
mod links;
mod orchestrator;
mod sinks;
mod worker;

pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use links::extract_links;
pub use orchestrator::{CrawlReport, Orchestrator};
pub use sinks::DiscoveryTotals;
pub use worker::{DiscoveryBatch, Dispatch, DocumentResult};

use crate::config::Config;
use crate::sites::SiteRegistry;
use crate::storage::open_storage;
use crate::url::{extract_domain, parse_seed_url};
use crate::{HarvestError, UrlError};
use std::path::Path;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed URL and find the site responsible for it
/// 2. Open (or create) the frontier database
/// 3. Build the HTTP client
/// 4. Run the orchestrator until the frontier goes idle
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `sites` - Registry used to pick the site collaborator
/// * `start_url` - Seed URL of the crawl
/// * `database` - Path of the SQLite frontier database
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(HarvestError)` - Bad seed or configuration, or a storage failure
pub async fn crawl(
    config: &Config,
    sites: &SiteRegistry,
    start_url: &str,
    database: &Path,
) -> Result<CrawlReport, HarvestError> {
    let seed = parse_seed_url(start_url)?;
    let domain = extract_domain(&seed).ok_or(UrlError::MissingDomain)?;
    let site = sites.find(&domain)?;

    let store = open_storage(database)?;
    let client = build_http_client(&config.user_agent, &config.crawler)?;

    Orchestrator::new(site, store, client, config.crawler.clone())
        .run(seed.as_str())
        .await
}
