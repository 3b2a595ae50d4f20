//! Bourse-Harvest main entry point
//!
//! This is the command-line interface for the dividend listing harvester.

use bourse_harvest::config::{load_config_with_hash, Config};
use bourse_harvest::crawler::{fetch_download, harvest_listing};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bourse-Harvest: dividend listing harvester
///
/// Drives a browser through WebDriver to collect dividend announcements from
/// a paginated listing into CSV, or to download a single published data file.
#[derive(Parser, Debug)]
#[command(name = "bourse-harvest")]
#[command(version)]
#[command(about = "Harvest dividend listings and data downloads", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Which flow to run
    #[arg(value_enum, default_value_t = Mode::Listing)]
    mode: Mode,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would run without opening a browser
    #[arg(long)]
    dry_run: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Page through the listing and write a CSV
    Listing,
    /// Download the configured data file
    Download,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, cli.mode);
        return Ok(());
    }

    match cli.mode {
        Mode::Listing => handle_listing(&config).await,
        Mode::Download => handle_download(&config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bourse_harvest=info,warn"),
            1 => EnvFilter::new("bourse_harvest=debug,info"),
            2 => EnvFilter::new("bourse_harvest=trace,debug"),
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

/// Handles --dry-run: shows the resolved configuration
fn handle_dry_run(config: &Config, mode: Mode) {
    println!("=== Bourse-Harvest Dry Run ===\n");

    println!("Driver:");
    println!("  WebDriver: {}", config.driver.webdriver_url);
    println!(
        "  Browser: {} ({})",
        config.driver.browser,
        if config.driver.headless {
            "headless"
        } else {
            "windowed"
        }
    );
    match &config.consent {
        Some(consent) => println!("  Consent control: {}", consent.locator()),
        None => println!("  Consent control: none"),
    }

    match mode {
        Mode::Listing => {
            println!("\nListing:");
            println!("  Start: {}", config.listing.url);
            println!("  Next control: {}", config.listing.next_locator());
            println!("  Disabled marker: {}", config.listing.disabled_marker);
            println!("  Settle delay: {}ms", config.listing.settle_delay_ms);
            if let Some(max) = config.listing.max_pages {
                println!("  Page limit: {}", max);
            }
            println!("  Output: {}", config.listing.output_path.display());
        }
        Mode::Download => match &config.download {
            Some(download) => {
                println!("\nDownload:");
                println!("  Page: {}", download.url);
                println!("  Link: {}", download.link_locator());
                println!("  Directory: {}", download.directory.display());
                println!(
                    "  Waiting up to {}s, polling every {}ms",
                    download.timeout_secs, download.poll_interval_ms
                );
            }
            None => println!("\n✗ No [download] section configured"),
        },
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the listing flow
async fn handle_listing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match harvest_listing(config).await {
        Ok(report) => {
            println!(
                "✓ {} records from {} pages written to {}",
                report.dataset.len(),
                report.outcome.pages_fetched,
                config.listing.output_path.display()
            );
            if !report.outcome.termination.is_normal_end() {
                println!("⚠ Listing {}", report.outcome.termination);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the download flow
async fn handle_download(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match fetch_download(config).await {
        Ok(outcome) => {
            println!(
                "✓ Download finished after {:.1}s: {}",
                outcome.waited.as_secs_f64(),
                outcome.completed_files.join(", ")
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Download failed: {}", e);
            Err(e.into())
        }
    }
}
