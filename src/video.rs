use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Discovers video files in the batch folder
#[derive(Clone)]
pub struct VideoScanner {
    /// Supported video extensions, lowercase
    supported_extensions: Vec<String>,
}

impl VideoScanner {
    pub fn new(extensions: &[String]) -> Self {
        Self {
            supported_extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// Discover video files directly inside a folder (no recursion).
    ///
    /// Results are sorted lexicographically so batch runs are reproducible
    /// regardless of the order the filesystem returns entries in.
    pub async fn discover_videos(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut videos = Vec::new();

        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if path.is_dir() {
                continue;
            }

            if let Some(extension) = path.extension() {
                if let Some(ext_str) = extension.to_str() {
                    if self.supported_extensions.contains(&ext_str.to_lowercase()) {
                        videos.push(path);
                    }
                }
            }
        }

        videos.sort();

        info!("🔍 Discovered {} videos in {}", videos.len(), dir.display());
        Ok(videos)
    }
}
