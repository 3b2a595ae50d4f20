//! Download completion detection
//!
//! Browsers give no completion signal for a download. While a file is being
//! written it carries an in-progress suffix (Chrome uses `.crdownload`); the
//! download is complete once no such file remains in the target directory.
//!
//! - `FilenameProbe`: lists a directory (tokio filesystem or a test double)
//! - `DownloadTicket`: directory, suffix, and deadline for one download
//! - `DownloadMonitor`: polls the probe until completion or deadline

mod monitor;
mod probe;

pub use monitor::{DownloadMonitor, DownloadOutcome, DownloadTicket, DEFAULT_POLL_INTERVAL};
pub use probe::{FilenameProbe, FsProbe};
