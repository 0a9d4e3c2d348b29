//! WAV file sink using hound
//!
//! Writes the standard uncompressed container: a header carrying channel
//! count, sample rate, and bit depth, followed by the raw interleaved PCM
//! payload in arrival order.

use std::path::Path;

use async_trait::async_trait;
use hound::{WavSpec, WavWriter};

use crate::application::ports::{AudioSink, SaveError, SaveReport};
use crate::domain::recording::Recording;

/// hound-backed WAV sink
pub struct WavSink;

impl WavSink {
    pub fn new() -> Self {
        Self
    }

    fn write(path: &Path, recording: &Recording) -> Result<(), SaveError> {
        let spec = WavSpec {
            channels: recording.channels,
            sample_rate: recording.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let io_err = |e: hound::Error| SaveError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut writer = WavWriter::create(path, spec).map_err(io_err)?;
        for sample in recording.samples() {
            writer.write_sample(sample).map_err(io_err)?;
        }
        writer.finalize().map_err(io_err)?;

        Ok(())
    }
}

impl Default for WavSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSink for WavSink {
    async fn save(&self, path: &Path, recording: Recording) -> Result<SaveReport, SaveError> {
        if recording.is_empty() {
            return Err(SaveError::EmptyBuffer);
        }

        let duration_secs = recording.duration_secs();
        let total_samples = recording.total_samples();
        let path_buf = path.to_path_buf();

        // File writing off the async runtime
        tokio::task::spawn_blocking({
            let path = path_buf.clone();
            move || Self::write(&path, &recording)
        })
        .await
        .map_err(|e| SaveError::Io {
            path: path_buf.clone(),
            message: format!("write task failed: {}", e),
        })??;

        Ok(SaveReport {
            path: path_buf,
            duration_secs,
            total_samples,
        })
    }
}
