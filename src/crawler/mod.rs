//! Crawler module for listing harvesting and file downloads
//!
//! This module contains the core harvesting logic, including:
//! - Record extraction from rendered listing pages
//! - The pagination state machine
//! - Deduplicating aggregation of page batches
//! - Session orchestration and driver lifecycle

mod aggregator;
mod extractor;
mod pagination;
mod record;
mod session;

pub use aggregator::DatasetAggregator;
pub use extractor::{parse_listing_date, RecordExtractor};
pub use pagination::{PaginationController, PaginationOutcome, PaginationSettings};
pub use record::{Dataset, IdentityKey, PageBatch, PageRecord};
pub use session::{CrawlSession, DownloadRequest, ListingReport};

use crate::config::Config;
use crate::download::{DownloadMonitor, DownloadOutcome, FsProbe};
use crate::driver::WebDriverClient;
use crate::output::CsvSink;
use crate::{ConfigError, HarvestError};

/// Runs the listing flow described by `config`
///
/// This is the main entry point for harvesting. It will:
/// 1. Compile the extractor for the configured markup
/// 2. Open a WebDriver session
/// 3. Page through the listing, collecting records
/// 4. Write the deduplicated dataset to the configured CSV file
/// 5. Close the WebDriver session
///
/// # Returns
///
/// * `Ok(ListingReport)` - Harvest completed (check `outcome.termination`)
/// * `Err(HarvestError)` - Harvest failed
pub async fn harvest_listing(config: &Config) -> Result<ListingReport, HarvestError> {
    let extractor = RecordExtractor::new(&config.extractor)?;
    let controller =
        PaginationController::new(PaginationSettings::from_config(&config.listing), extractor);
    let mut sink = CsvSink::new(&config.listing.output_path);

    let driver = WebDriverClient::connect(&config.driver, None).await?;
    CrawlSession::new(driver)
        .with_consent(config.consent.clone())
        .with_page_load_delay(config.driver.page_load_delay())
        .run_listing(&config.listing.url, controller, &mut sink)
        .await
}

/// Runs the single-file download flow described by `config`
///
/// Browsers need an absolute download directory, so a relative one is
/// resolved against the working directory first. The session creates it.
pub async fn fetch_download(config: &Config) -> Result<DownloadOutcome, HarvestError> {
    let download = config.download.as_ref().ok_or_else(|| {
        ConfigError::Validation("a [download] section is required for downloads".to_string())
    })?;

    let mut request = DownloadRequest::from_config(download);
    if request.directory.is_relative() {
        let cwd = std::env::current_dir().map_err(|source| HarvestError::Io {
            path: download.directory.clone(),
            source,
        })?;
        request.directory = cwd.join(&request.directory);
    }
    let monitor = DownloadMonitor::new(FsProbe).with_poll_interval(download.poll_interval());

    let driver = WebDriverClient::connect(&config.driver, Some(&request.directory)).await?;
    CrawlSession::new(driver)
        .with_consent(config.consent.clone())
        .with_page_load_delay(config.driver.page_load_delay())
        .run_download(&request, &monitor)
        .await
}
