//! Audio sink port interface

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::Recording;

/// Save errors
#[derive(Debug, Clone, Error)]
pub enum SaveError {
    /// Nothing was retained; non-fatal, the save is skipped with a warning
    #[error("No audio data to save")]
    EmptyBuffer,

    #[error("Failed to write {path}: {message}")]
    Io { path: PathBuf, message: String },
}

/// Result of a successful save
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub path: PathBuf,
    pub duration_secs: f64,
    pub total_samples: usize,
}

/// Port for serializing a finished recording to disk.
///
/// Saving the same recording twice must produce byte-identical files. Not
/// safe to call while the capture callback still appends; the use case
/// guarantees the stream is closed first.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn save(&self, path: &Path, recording: Recording) -> Result<SaveReport, SaveError>;
}
