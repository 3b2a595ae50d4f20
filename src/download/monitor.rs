use crate::download::probe::FilenameProbe;
use crate::{HarvestError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

/// Default time between directory checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// One pending download
///
/// Created when the download is triggered; consumed by
/// [`DownloadMonitor::wait`].
#[derive(Debug, Clone)]
pub struct DownloadTicket {
    pub target_directory: PathBuf,
    pub in_progress_suffix: String,
    pub deadline: Instant,
}

impl DownloadTicket {
    /// Creates a ticket whose deadline is `timeout` from now
    pub fn new(directory: &Path, in_progress_suffix: &str, timeout: Duration) -> Self {
        Self::with_deadline(directory, in_progress_suffix, Instant::now() + timeout)
    }

    pub fn with_deadline(directory: &Path, in_progress_suffix: &str, deadline: Instant) -> Self {
        Self {
            target_directory: directory.to_path_buf(),
            in_progress_suffix: in_progress_suffix.to_string(),
            deadline,
        }
    }

    fn is_in_progress(&self, name: &str) -> bool {
        name.ends_with(&self.in_progress_suffix)
    }
}

/// A download that finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Files in the directory when completion was detected
    pub completed_files: Vec<String>,

    /// Number of directory listings taken, including the final one
    pub polls: u32,

    pub waited: Duration,
}

/// Polls a directory until a download's in-progress file disappears
#[derive(Debug, Clone)]
pub struct DownloadMonitor<P> {
    probe: P,
    poll_interval: Duration,
}

impl<P: FilenameProbe> DownloadMonitor<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Waits for the ticket's download to complete
    ///
    /// The directory is checked immediately, then once per poll interval.
    /// The last sleep is shortened so a final check happens at the deadline.
    ///
    /// # Returns
    ///
    /// * `Ok(DownloadOutcome)` - No in-progress file was present
    /// * `Err(HarvestError::Timeout)` - An in-progress file outlived the deadline
    /// * `Err(HarvestError::Io)` - The directory could not be listed
    pub async fn wait(&self, ticket: DownloadTicket) -> Result<DownloadOutcome> {
        let started = Instant::now();
        let mut polls = 0;

        loop {
            let names = self
                .probe
                .list_filenames(&ticket.target_directory)
                .await
                .map_err(|source| HarvestError::Io {
                    path: ticket.target_directory.clone(),
                    source,
                })?;
            polls += 1;

            let pending = names
                .iter()
                .filter(|name| ticket.is_in_progress(name))
                .count();
            if pending == 0 {
                let waited = started.elapsed();
                tracing::info!(
                    "Download in {} complete after {:?} ({} polls)",
                    ticket.target_directory.display(),
                    waited,
                    polls
                );
                return Ok(DownloadOutcome {
                    completed_files: names,
                    polls,
                    waited,
                });
            }

            let now = Instant::now();
            if now >= ticket.deadline {
                return Err(HarvestError::Timeout {
                    directory: ticket.target_directory,
                    waited: started.elapsed(),
                });
            }

            tracing::debug!(
                "{} download(s) still in progress in {}",
                pending,
                ticket.target_directory.display()
            );
            let remaining = ticket.deadline.saturating_duration_since(now);
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}
