use crate::crawler::record::{Dataset, IdentityKey, PageBatch};
use crate::output::{DatasetSink, OutputResult};
use std::collections::HashSet;

/// Merges page batches into one deduplicated [`Dataset`]
///
/// Records are kept in arrival order. A record whose identity key was already
/// seen is dropped; the first-seen copy wins.
#[derive(Debug, Default)]
pub struct DatasetAggregator {
    dataset: Dataset,
    seen: HashSet<IdentityKey>,
    dropped: usize,
}

impl DatasetAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch, returning how many of its records were new
    pub fn append(&mut self, batch: PageBatch) -> usize {
        let mut accepted = 0;

        for record in batch {
            if self.seen.insert(record.identity_key()) {
                self.dataset.push(record);
                accepted += 1;
            } else {
                tracing::trace!(
                    "Dropping repeated record for '{}' ({:?})",
                    record.subject,
                    record.announce_date
                );
                self.dropped += 1;
            }
        }

        accepted
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Number of records dropped as repeats so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Hands the dataset to `sink` and returns it
    ///
    /// Sink errors are returned unchanged.
    pub fn finalize<S: DatasetSink + ?Sized>(self, sink: &mut S) -> OutputResult<Dataset> {
        tracing::info!(
            "Finalizing dataset: {} records kept, {} repeats dropped",
            self.dataset.len(),
            self.dropped
        );
        sink.persist(&self.dataset)?;
        Ok(self.dataset)
    }
}
