//! Configuration module for Recipe-Harvester
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Without a file the defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use recipe_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Idle threshold: {}", config.crawler.idle_threshold);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config, resolve_config};
pub use validation::validate;
