use crate::crawler::{Dataset, PageRecord};
use crate::output::traits::{DatasetSink, OutputResult};
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column headers, in output order
pub const COLUMNS: [&str; 5] = [
    "Company",
    "Dividend",
    "Announce Date",
    "Book Closure Date",
    "Payment Date",
];

/// Date layout used in the CSV, matching the listing's own spelling
const DATE_FORMAT: &str = "%d-%b-%Y";

/// Writes a dataset to a CSV file, replacing any previous content
///
/// Unknown fields are written as empty cells.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSink for CsvSink {
    fn persist(&mut self, dataset: &Dataset) -> OutputResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::File::create(&self.path)?;
        write_dataset(file, dataset)?;

        tracing::info!(
            "Wrote {} records to {}",
            dataset.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Writes the header and one row per record to `writer`
pub fn write_dataset<W: Write>(writer: W, dataset: &Dataset) -> OutputResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS)?;

    for record in dataset.iter() {
        wtr.write_record(row(record))?;
    }

    wtr.flush()?;
    Ok(())
}

fn row(record: &PageRecord) -> [String; 5] {
    [
        record.subject.clone(),
        record.amount.map(|a| a.to_string()).unwrap_or_default(),
        format_date(record.announce_date),
        format_date(record.closure_date),
        format_date(record.payment_date),
    ]
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
