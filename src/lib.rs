//! Bourse-Harvest: dividend listing extraction and download capture
//!
//! This crate drives a rendered web listing page by page, extracts corporate
//! dividend announcements into a deduplicated dataset, and separately waits
//! for a browser-initiated file download to finish.

pub mod config;
pub mod crawler;
pub mod download;
pub mod driver;
pub mod output;
pub mod state;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for Bourse-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Driver error: {0}")]
    Driver(#[from] driver::DriverError),

    #[error("Interaction failed for {selector}: {message}")]
    Interaction { selector: String, message: String },

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Download in {} did not finish within {waited:?}", directory.display())]
    Timeout { directory: PathBuf, waited: Duration },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PaginationState,
        to: state::PaginationState,
    },
}

impl HarvestError {
    /// True for the download deadline error, so callers can extend and retry
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Page content errors
///
/// Only encoding-level problems are errors; missing fields never are.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Page content is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// Result type alias for Bourse-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlSession, Dataset, PageBatch, PageRecord};
pub use download::{DownloadMonitor, DownloadOutcome, DownloadTicket};
pub use driver::{Driver, ElementHandle, Locator, SelectorKind};
pub use state::{PaginationCursor, PaginationState, Termination};
