//! Output sink trait and error types
//!
//! This module defines the trait interface for dataset sinks and the errors
//! they can raise.

use crate::crawler::Dataset;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for a finalized dataset
pub trait DatasetSink {
    /// Persists every record of `dataset`, in order
    fn persist(&mut self, dataset: &Dataset) -> OutputResult<()>;
}
