//! Output module for persisting harvested datasets
//!
//! This module handles:
//! - The sink interface the aggregator finalizes into
//! - Writing datasets as CSV with a fixed column order

mod csv_sink;
mod traits;

pub use csv_sink::{CsvSink, COLUMNS};
pub use traits::{DatasetSink, OutputError, OutputResult};
