// Watermark repository backed by a local text file.
//
// Format
// - A single RFC 3339 UTC timestamp, overwritten wholesale on every successful tick.
// - A missing or blank file means no watermark has been stored yet.
//
// Writes
// - Written to a sibling temporary file first, then renamed over the target.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::modules::notifications::core::ports::{WatermarkError, WatermarkRepository};
use crate::modules::notifications::core::watermark::Watermark;

#[derive(Debug, Clone)]
pub struct FileWatermarkRepository {
    path: PathBuf,
}

impl FileWatermarkRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "watermark".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl WatermarkRepository for FileWatermarkRepository {
    async fn get(&self) -> Result<Option<Watermark>, WatermarkError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = text.trim();
        if value.is_empty() {
            return Ok(None);
        }
        Watermark::parse(value)
            .map(Some)
            .map_err(|_| WatermarkError::Corrupt {
                value: value.to_string(),
            })
    }

    async fn set(&self, watermark: Watermark) -> Result<(), WatermarkError> {
        let staging = self.staging_path();
        tokio::fs::write(&staging, watermark.to_rfc3339()).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        tracing::debug!(path = %self.path.display(), %watermark, "watermark persisted");
        Ok(())
    }
}
