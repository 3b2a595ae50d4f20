//! Crawl session - driver lifecycle and flow orchestration
//!
//! A session owns one driver for its whole life. Both flows consume the
//! session and release the driver before returning, whether the flow
//! succeeded or not.

use crate::config::{ConsentConfig, DownloadConfig};
use crate::crawler::aggregator::DatasetAggregator;
use crate::crawler::pagination::{PaginationController, PaginationOutcome};
use crate::crawler::record::Dataset;
use crate::download::{DownloadMonitor, DownloadOutcome, DownloadTicket, FilenameProbe};
use crate::driver::{Driver, DriverError, ElementHandle, Locator};
use crate::output::DatasetSink;
use crate::{HarvestError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Result of the listing flow
#[derive(Debug, Clone)]
pub struct ListingReport {
    /// The finalized, deduplicated records
    pub dataset: Dataset,

    pub outcome: PaginationOutcome,
}

/// What to download and where it lands
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub link: Locator,
    pub directory: PathBuf,
    pub in_progress_suffix: String,
    pub timeout: Duration,
}

impl DownloadRequest {
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self {
            url: config.url.clone(),
            link: config.link_locator(),
            directory: config.directory.clone(),
            in_progress_suffix: config.in_progress_suffix.clone(),
            timeout: config.timeout(),
        }
    }
}

/// Exclusive owner of a driver for one listing or download run
pub struct CrawlSession<D: Driver> {
    driver: D,
    consent: Option<ConsentConfig>,
    page_load_delay: Duration,
}

impl<D: Driver> CrawlSession<D> {
    /// Takes ownership of an acquired driver
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            consent: None,
            page_load_delay: Duration::ZERO,
        }
    }

    /// Sets the consent control to dismiss after the first navigation
    pub fn with_consent(mut self, consent: Option<ConsentConfig>) -> Self {
        self.consent = consent;
        self
    }

    /// Sets the pause between the first navigation and any interaction
    pub fn with_page_load_delay(mut self, delay: Duration) -> Self {
        self.page_load_delay = delay;
        self
    }

    /// Harvests a paginated listing into `sink`
    ///
    /// # Arguments
    ///
    /// * `url` - First page of the listing
    /// * `controller` - A fresh pagination controller
    /// * `sink` - Receives the finalized dataset
    ///
    /// # Returns
    ///
    /// * `Ok(ListingReport)` - The dataset and how the listing ended
    /// * `Err(HarvestError)` - Navigation failed, the driver became unusable,
    ///   or the sink could not persist the dataset
    pub async fn run_listing<S: DatasetSink + ?Sized>(
        mut self,
        url: &str,
        mut controller: PaginationController,
        sink: &mut S,
    ) -> Result<ListingReport> {
        let result = self.listing_flow(url, &mut controller, sink).await;
        self.release().await;
        result
    }

    /// Triggers a download and waits for the browser to finish it
    ///
    /// # Returns
    ///
    /// * `Ok(DownloadOutcome)` - No in-progress file remained before the deadline
    /// * `Err(HarvestError::Interaction)` - The download link could not be used
    /// * `Err(HarvestError::Timeout)` - The deadline elapsed first
    /// * `Err(HarvestError::Io)` - The download directory could not be listed
    pub async fn run_download<P: FilenameProbe>(
        mut self,
        request: &DownloadRequest,
        monitor: &DownloadMonitor<P>,
    ) -> Result<DownloadOutcome> {
        let result = self.download_flow(request, monitor).await;
        self.release().await;
        result
    }

    async fn listing_flow<S: DatasetSink + ?Sized>(
        &mut self,
        url: &str,
        controller: &mut PaginationController,
        sink: &mut S,
    ) -> Result<ListingReport> {
        self.open(url).await?;

        let mut aggregator = DatasetAggregator::new();
        let outcome = controller.run(&mut self.driver, &mut aggregator).await?;
        let dataset = aggregator.finalize(sink)?;

        Ok(ListingReport { dataset, outcome })
    }

    async fn download_flow<P: FilenameProbe>(
        &mut self,
        request: &DownloadRequest,
        monitor: &DownloadMonitor<P>,
    ) -> Result<DownloadOutcome> {
        tokio::fs::create_dir_all(&request.directory)
            .await
            .map_err(|source| HarvestError::Io {
                path: request.directory.clone(),
                source,
            })?;

        self.open(&request.url).await?;

        let link = self.locate(&request.link).await?;
        self.driver
            .click(&link)
            .await
            .map_err(|e| interaction_error(&request.link, e))?;
        tracing::info!("Download started from {}", request.link);

        let ticket = DownloadTicket::new(
            &request.directory,
            &request.in_progress_suffix,
            request.timeout,
        );
        monitor.wait(ticket).await
    }

    /// Navigates to the start page, waits for it to load, clears consent
    async fn open(&mut self, url: &str) -> Result<()> {
        tracing::info!("Opening {}", url);
        self.driver.navigate(url).await?;
        tokio::time::sleep(self.page_load_delay).await;
        self.dismiss_consent().await;
        Ok(())
    }

    /// Best-effort removal of a consent overlay; failures are only logged
    async fn dismiss_consent(&mut self) {
        let Some(consent) = self.consent.clone() else {
            return;
        };
        let locator = consent.locator();

        let control = match self.driver.find_element(&locator).await {
            Ok(Some(control)) => control,
            Ok(None) | Err(DriverError::NotFound(_)) => {
                tracing::info!("No consent control found ({})", locator);
                return;
            }
            Err(e) => {
                tracing::warn!("Could not look up consent control {}: {}", locator, e);
                return;
            }
        };

        match self.driver.click(&control).await {
            Ok(()) => {
                tracing::info!("Dismissed consent control {}", locator);
                tokio::time::sleep(consent.dismiss_delay()).await;
            }
            Err(e) => tracing::warn!("Could not dismiss consent control {}: {}", locator, e),
        }
    }

    /// Finds an element the flow cannot continue without
    async fn locate(&mut self, locator: &Locator) -> Result<ElementHandle> {
        match self.driver.find_element(locator).await {
            Ok(Some(element)) => Ok(element),
            Ok(None) => Err(HarvestError::Interaction {
                selector: locator.to_string(),
                message: "element not found".to_string(),
            }),
            Err(e) => Err(interaction_error(locator, e)),
        }
    }

    async fn release(&mut self) {
        if let Err(e) = self.driver.release().await {
            tracing::warn!("Failed to release driver: {}", e);
        }
    }
}

/// Fatal driver errors stay driver errors; the rest become interaction errors
fn interaction_error(locator: &Locator, error: DriverError) -> HarvestError {
    if error.is_fatal() {
        return error.into();
    }
    HarvestError::Interaction {
        selector: locator.to_string(),
        message: error.to_string(),
    }
}
