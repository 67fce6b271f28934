//! File-backed transcript persistence.
//!
//! Stores the conversation history as a pretty-printed JSON array of
//! `[query, answer]` pairs, written atomically so an interrupted save never
//! leaves a truncated file behind.

use async_trait::async_trait;
use codeon_core::error::{CodeonError, Result};
use codeon_core::history::HistoryRepository;
use codeon_core::transcript::Transcript;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// A [`HistoryRepository`] that keeps the transcript in a single JSON file.
pub struct JsonHistoryRepository {
    path: PathBuf,
}

impl JsonHistoryRepository {
    /// Creates a repository backed by the file at `path`. The file does not
    /// need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this repository reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `content` to the target atomically: temp file in the same
    /// directory, fsync, then rename over the destination.
    fn write_atomic(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|err| CodeonError::file_access(parent.display().to_string(), err))?;
            }
        }

        let tmp_path = self.temp_path()?;
        let map_tmp_err =
            |err: std::io::Error| CodeonError::file_access(tmp_path.display().to_string(), err);

        let mut tmp_file = File::create(&tmp_path).map_err(map_tmp_err)?;
        tmp_file.write_all(content.as_bytes()).map_err(map_tmp_err)?;
        tmp_file.sync_all().map_err(map_tmp_err)?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)
            .map_err(|err| CodeonError::file_access(self.path.display().to_string(), err))?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self.path.file_name().ok_or_else(|| {
            CodeonError::file_access(self.path.display().to_string(), "path has no file name")
        })?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(match self.path.parent() {
            Some(parent) => parent.join(tmp_name),
            None => PathBuf::from(tmp_name),
        })
    }
}

#[async_trait]
impl HistoryRepository for JsonHistoryRepository {
    async fn load(&self) -> Result<Transcript> {
        if !self.path.exists() {
            return Ok(Transcript::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|err| CodeonError::file_access(self.path.display().to_string(), err))?;

        match serde_json::from_str(&content) {
            Ok(transcript) => Ok(transcript),
            Err(err) => {
                tracing::warn!(
                    "Discarding malformed history at {}: {}",
                    self.path.display(),
                    err
                );
                Ok(Transcript::new())
            }
        }
    }

    async fn save(&self, transcript: &Transcript) -> Result<()> {
        let json = serde_json::to_string_pretty(transcript).map_err(|err| {
            CodeonError::malformed_state(self.path.display().to_string(), err.to_string())
        })?;
        self.write_atomic(&json)
    }
}
