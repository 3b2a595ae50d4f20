//! Pagination controller - the page-by-page harvesting loop
//!
//! The loop is an explicit state machine:
//!
//! ```text
//! Fetching -> Extracting -> Advancing -> Fetching ...
//!                               |
//!                               +-> Terminated (absent/disabled control, masked error)
//! Fetching / Advancing -> Failed (driver unusable)
//! ```
//!
//! Navigation trouble is resolved toward termination rather than retried.
//! The [`Termination`] in the outcome tells callers whether the listing
//! really ended or the loop stopped on an interaction error.

use crate::config::ListingConfig;
use crate::crawler::aggregator::DatasetAggregator;
use crate::crawler::extractor::RecordExtractor;
use crate::crawler::record::PageBatch;
use crate::driver::{Driver, DriverError, Locator};
use crate::state::{EndCause, PaginationCursor, PaginationState, Termination};
use crate::{HarvestError, Result};
use std::time::Duration;

/// Attribute inspected for the disabled marker
const CLASS_ATTRIBUTE: &str = "class";

/// How to recognise and follow the next-page control
#[derive(Debug, Clone)]
pub struct PaginationSettings {
    pub next_control: Locator,

    /// Text whose presence in the control's class marks it as disabled
    pub disabled_marker: String,

    /// Pause after advancing, before fetching the new page
    pub settle_delay: Duration,

    pub max_pages: Option<u32>,
}

impl PaginationSettings {
    pub fn from_config(config: &ListingConfig) -> Self {
        Self {
            next_control: config.next_locator(),
            disabled_marker: config.disabled_marker.clone(),
            settle_delay: config.settle_delay(),
            max_pages: config.max_pages,
        }
    }
}

/// Summary of a finished pagination run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationOutcome {
    pub pages_fetched: u32,

    /// Records extracted across all pages, before deduplication
    pub records_extracted: usize,

    pub termination: Termination,
}

/// Result of inspecting the next control
enum Step {
    Continue,
    Stop(Termination),
}

/// Drives fetch, extract, and advance until the listing ends
#[derive(Debug)]
pub struct PaginationController {
    settings: PaginationSettings,
    extractor: RecordExtractor,
    state: PaginationState,
    cursor: PaginationCursor,
}

impl PaginationController {
    pub fn new(settings: PaginationSettings, extractor: RecordExtractor) -> Self {
        Self {
            settings,
            extractor,
            state: PaginationState::Fetching,
            cursor: PaginationCursor::new(),
        }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    /// Runs the loop from the current page until termination
    ///
    /// Every page's batch is appended to `aggregator` as soon as it is
    /// extracted, so an early stop still leaves a consistent partial dataset.
    ///
    /// # Returns
    ///
    /// * `Ok(PaginationOutcome)` - The loop reached Terminated
    /// * `Err(HarvestError::Driver)` - The driver became unusable (state Failed)
    /// * `Err(HarvestError::InvalidTransition)` - The controller already finished
    pub async fn run<D: Driver + ?Sized>(
        &mut self,
        driver: &mut D,
        aggregator: &mut DatasetAggregator,
    ) -> Result<PaginationOutcome> {
        if self.state.is_terminal() {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: PaginationState::Fetching,
            });
        }

        let mut records_extracted = 0;

        let termination = loop {
            let content = match driver.fetch_rendered_content().await {
                Ok(content) => content,
                Err(e) => break self.absorb(e, "fetching page content")?,
            };
            self.cursor.record_fetch();
            let page = self.cursor.pages_fetched();

            self.transition(PaginationState::Extracting)?;
            let batch = self.extractor.extract(&content).unwrap_or_else(|e| {
                tracing::warn!("Page {}: {}; continuing with an empty batch", page, e);
                PageBatch::new()
            });
            let extracted = batch.len();
            records_extracted += extracted;
            let accepted = aggregator.append(batch);
            tracing::debug!(
                "Page {}: {} records extracted, {} new",
                page,
                extracted,
                accepted
            );

            self.transition(PaginationState::Advancing)?;
            match self.advance(driver).await? {
                Step::Stop(termination) => break termination,
                Step::Continue => {
                    tokio::time::sleep(self.settings.settle_delay).await;
                    self.transition(PaginationState::Fetching)?;
                }
            }
        };

        self.cursor.terminate(termination.clone());
        self.transition(PaginationState::Terminated)?;

        if termination.is_normal_end() {
            tracing::info!(
                "Listing finished after {} pages: {}",
                self.cursor.pages_fetched(),
                termination
            );
        } else {
            tracing::warn!(
                "Listing stopped after {} pages, results may be partial: {}",
                self.cursor.pages_fetched(),
                termination
            );
        }

        Ok(PaginationOutcome {
            pages_fetched: self.cursor.pages_fetched(),
            records_extracted,
            termination,
        })
    }

    /// Decides whether and how to move to the next page
    async fn advance<D: Driver + ?Sized>(&mut self, driver: &mut D) -> Result<Step> {
        if let Some(max) = self.settings.max_pages {
            if self.cursor.pages_fetched() >= max {
                return Ok(Step::Stop(Termination::NormalEnd(EndCause::PageLimitReached)));
            }
        }

        let control = match driver.find_element(&self.settings.next_control).await {
            Ok(Some(control)) => control,
            Ok(None) | Err(DriverError::NotFound(_)) => {
                return Ok(Step::Stop(Termination::NormalEnd(EndCause::ControlAbsent)));
            }
            Err(e) => return self.absorb(e, "locating next control").map(Step::Stop),
        };

        let class = match driver.attribute_of(&control, CLASS_ATTRIBUTE).await {
            Ok(Some(class)) => class,
            Ok(None) => {
                return Ok(Step::Stop(self.interaction_stop(
                    "reading next control class",
                    "control has no class attribute",
                )))
            }
            Err(e) => return self.absorb(e, "reading next control class").map(Step::Stop),
        };
        if class.contains(self.settings.disabled_marker.as_str()) {
            return Ok(Step::Stop(Termination::NormalEnd(EndCause::ControlDisabled)));
        }

        if let Err(e) = driver.click(&control).await {
            return self.absorb(e, "clicking next control").map(Step::Stop);
        }

        Ok(Step::Continue)
    }

    /// Turns a driver error into a stop, or into Failed when it is fatal
    fn absorb(&mut self, error: DriverError, context: &str) -> Result<Termination> {
        if error.is_fatal() {
            tracing::error!("Driver failed while {}: {}", context, error);
            self.transition(PaginationState::Failed)?;
            return Err(error.into());
        }

        Ok(self.interaction_stop(context, &error.to_string()))
    }

    fn interaction_stop(&self, context: &str, detail: &str) -> Termination {
        tracing::warn!("Treating failure while {} as end of listing: {}", context, detail);
        Termination::EndedOnInteractionError(format!("{}: {}", context, detail))
    }

    fn transition(&mut self, next: PaginationState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("Pagination {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}
