use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Lists the file names present in a directory
#[async_trait]
pub trait FilenameProbe: Send + Sync {
    async fn list_filenames(&self, directory: &Path) -> io::Result<Vec<String>>;
}

/// Probe backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

#[async_trait]
impl FilenameProbe for FsProbe {
    async fn list_filenames(&self, directory: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(directory).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort();
        Ok(names)
    }
}
