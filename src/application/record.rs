//! Record session use case

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::recording::RecorderState;

use super::ports::{
    AudioSink, Capture, CaptureError, KeyCommand, KeyInput, KeyInputError, ProgressCallback,
    SaveError, SaveReport,
};

/// How often the control loop checks for key presses and signals
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors from the record session use case
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Save failed: {0}")]
    Save(#[from] SaveError),

    #[error("Keyboard input failed: {0}")]
    Keys(#[from] KeyInputError),
}

/// Input parameters for a recording session
#[derive(Debug, Clone)]
pub struct RecordInput {
    /// Index of the input device to capture from
    pub device_index: usize,
    /// Where to write the WAV file on stop
    pub output: PathBuf,
}

/// Output from a finished session
#[derive(Debug, Clone)]
pub struct RecordOutput {
    /// None when the buffer was empty and the save was skipped
    pub report: Option<SaveReport>,
    /// Number of frames retained during the session
    pub frame_count: usize,
    /// Whether the session ended via Ctrl-C/SIGINT rather than 'q'
    pub interrupted: bool,
}

/// Callbacks for status updates during the session
#[derive(Default)]
pub struct RecordCallbacks {
    /// Called once the capture stream is running
    pub on_started: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called when recording is paused
    pub on_paused: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called when recording resumes
    pub on_resumed: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called every poll iteration with elapsed milliseconds
    pub on_tick: Option<ProgressCallback>,
}

/// Keyboard-controlled recording session.
///
/// Drives the state machine: start capture on the chosen device, poll for
/// key commands, toggle pause, and on stop close the stream before reading
/// the frame buffer for saving. That stop-then-read ordering is the one
/// correctness-critical rule here; `Capture::stop` guarantees it.
pub struct RecordSessionUseCase<C, K, S>
where
    C: Capture,
    K: KeyInput,
    S: AudioSink,
{
    capture: C,
    keys: K,
    sink: S,
    shutdown: Arc<AtomicBool>,
}

impl<C, K, S> RecordSessionUseCase<C, K, S>
where
    C: Capture,
    K: KeyInput,
    S: AudioSink,
{
    /// Create a new use case instance
    pub fn new(capture: C, keys: K, sink: S) -> Self {
        Self {
            capture,
            keys,
            sink,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the shutdown flag for external signal handling
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run one recording session to completion
    pub async fn execute(
        &mut self,
        input: RecordInput,
        callbacks: RecordCallbacks,
    ) -> Result<RecordOutput, RecordError> {
        self.capture.start(input.device_index).await?;

        if let Some(ref cb) = callbacks.on_started {
            cb();
        }

        let interrupted = self.control_loop(&callbacks).await?;

        // Closes the stream synchronously before the frames are read, so
        // no callback can append during serialization.
        let recording = self.capture.stop().await?;
        let frame_count = recording.frame_count();

        let report = match self.sink.save(&input.output, recording).await {
            Ok(report) => Some(report),
            Err(SaveError::EmptyBuffer) => None,
            Err(e) => return Err(e.into()),
        };

        Ok(RecordOutput {
            report,
            frame_count,
            interrupted,
        })
    }

    /// Poll keys and the shutdown flag until a stop is requested.
    /// Returns true when the session ended via interrupt.
    async fn control_loop(&mut self, callbacks: &RecordCallbacks) -> Result<bool, RecordError> {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                return Ok(true);
            }

            match self.keys.poll(Duration::ZERO)? {
                Some(KeyCommand::TogglePause) => {
                    match self.capture.toggle_pause() {
                        RecorderState::Paused => {
                            if let Some(ref cb) = callbacks.on_paused {
                                cb();
                            }
                        }
                        RecorderState::Recording => {
                            if let Some(ref cb) = callbacks.on_resumed {
                                cb();
                            }
                        }
                        // Toggle outside Recording/Paused is a no-op
                        _ => {}
                    }
                }
                Some(KeyCommand::Stop) => return Ok(false),
                Some(KeyCommand::Interrupt) => return Ok(true),
                None => {}
            }

            if let Some(ref cb) = callbacks.on_tick {
                cb(self.capture.elapsed_ms());
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
