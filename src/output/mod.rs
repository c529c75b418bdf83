//! Output module for crawl summaries
//!
//! This module handles:
//! - Per-site statistics read back from the frontier database
//! - The summary printed at the end of a crawl

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics, SiteStatistics};

use crate::crawler::CrawlReport;

/// Prints the summary of a finished crawl to stdout
pub fn print_crawl_report(report: &CrawlReport) {
    println!("Crawl complete!");
    println!("  Recipes saved: {}", report.documents_saved);
    println!("  Pages harvested for links: {}", report.pages_harvested);
    println!("  New URLs discovered: {}", report.urls_discovered);
    println!("  Frontier polls: {}", report.polls);
}
