//! Recipe-Harvester main entry point
//!
//! This is the command-line interface for the Recipe-Harvester crawler.

use clap::{Parser, Subcommand};
use recipe_harvester::config::{resolve_config, Config};
use recipe_harvester::crawler::{build_http_client, crawl};
use recipe_harvester::images::{crop_square_all, ImageDownloader};
use recipe_harvester::output::{load_statistics, print_crawl_report, print_statistics};
use recipe_harvester::sites::{Classification, SiteRegistry};
use recipe_harvester::storage::open_storage;
use recipe_harvester::url::extract_domain;
use recipe_harvester::{parse_seed_url, HarvestError, UrlError};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Recipe-Harvester: a resumable recipe crawler
///
/// Crawls a supported recipe site from a seed URL and saves every recipe it
/// finds into a SQLite database. An interrupted crawl resumes where it stopped
/// when run again against the same database.
#[derive(Parser, Debug)]
#[command(name = "recipe-harvester")]
#[command(version)]
#[command(about = "A resumable recipe crawler", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a single page and print the recipe as JSON
    Single {
        /// Recipe page URL
        #[arg(long)]
        url: String,
    },

    /// Crawl a site starting from a seed URL
    Crawl {
        /// Seed URL
        #[arg(long)]
        url: String,

        /// SQLite database holding the frontier and saved recipes
        #[arg(long, value_name = "DB")]
        out: PathBuf,

        /// Number of fetch workers (overrides the config file)
        #[arg(long)]
        concurrency: Option<u32>,

        /// Path to TOML configuration file
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },

    /// Download the images of every saved recipe
    FetchImages {
        /// SQLite database written by `crawl`
        #[arg(long)]
        db: PathBuf,

        /// Directory to write images into
        #[arg(long)]
        out: PathBuf,
    },

    /// Crop downloaded images to centred squares
    ImgCropSquare {
        /// Directory of downloaded images
        #[arg(long)]
        img_dir: PathBuf,

        /// Directory to write the cropped PNGs into
        #[arg(long)]
        out_dir: PathBuf,

        /// Number of cropping workers
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },

    /// Show statistics from the database and exit
    Stats {
        /// SQLite database written by `crawl`
        #[arg(long)]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Single { url } => handle_single(&url).await,
        Command::Crawl {
            url,
            out,
            concurrency,
            config,
        } => handle_crawl(&url, &out, concurrency, config.as_deref()).await,
        Command::FetchImages { db, out } => handle_fetch_images(&db, &out).await,
        Command::ImgCropSquare {
            img_dir,
            out_dir,
            concurrency,
        } => handle_crop(&img_dir, &out_dir, concurrency).await,
        Command::Stats { db } => handle_stats(&db),
    };

    if let Err(e) = &result {
        tracing::error!("{}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("recipe_harvester=info,warn"),
            1 => EnvFilter::new("recipe_harvester=debug,info"),
            2 => EnvFilter::new("recipe_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `single`: classifies one page and prints the recipe
async fn handle_single(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let seed = parse_seed_url(url)?;
    let domain = extract_domain(&seed).ok_or(UrlError::MissingDomain)?;
    let site = SiteRegistry::default().find(&domain)?;

    let config = Config::default();
    let client = build_http_client(&config.user_agent, &config.crawler)?;

    match site.classify(&client, seed.as_str()).await {
        Classification::Document { document, .. } => {
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        Classification::NotDocument { reason, .. } => Err(HarvestError::NotDocument {
            url: url.to_string(),
            reason,
        }
        .into()),
    }
}

/// Handles `crawl`: runs the crawler until the frontier goes idle
async fn handle_crawl(
    url: &str,
    database: &Path,
    concurrency: Option<u32>,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = config_path {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = resolve_config(config_path, concurrency)?;

    tracing::info!(
        "Database: {}, workers: {}",
        database.display(),
        config.crawler.concurrency
    );

    let report = crawl(&config, &SiteRegistry::default(), url, database).await?;
    print_crawl_report(&report);

    Ok(())
}

/// Handles `fetch-images`: downloads the images of saved recipes
async fn handle_fetch_images(
    database: &Path,
    out_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_storage(database)?;
    let config = Config::default();
    let client = build_http_client(&config.user_agent, &config.crawler)?;

    let downloader = ImageDownloader::new(client, out_dir);
    let report = downloader
        .download_all(&store, &SiteRegistry::default())
        .await?;

    println!(
        "✓ {} recipes: {} images downloaded, {} already present",
        report.recipes, report.downloaded, report.skipped
    );
    Ok(())
}

/// Handles `img-crop-square`: crops downloaded images
async fn handle_crop(
    img_dir: &Path,
    out_dir: &Path,
    concurrency: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let written = crop_square_all(img_dir, out_dir, concurrency).await?;
    println!("✓ {} images cropped into {}", written, out_dir.display());
    Ok(())
}

/// Handles `stats`: shows statistics from the database
fn handle_stats(database: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", database.display());

    // Open the database
    let store = open_storage(database)?;

    // Load statistics
    let stats = load_statistics(&store)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}
