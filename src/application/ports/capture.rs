//! Audio capture port interface

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::recording::{RecorderState, Recording};

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Failed to start capture: {0}")]
    StartFailed(String),

    #[error("Capture stream failed: {0}")]
    StreamFailed(String),

    #[error("Invalid recorder state: cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: RecorderState,
    },
}

/// Progress callback reporting elapsed capture time in milliseconds
pub type ProgressCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Snapshot of an available input device, taken once at startup
#[derive(Debug, Clone)]
pub struct InputDeviceInfo {
    /// Position in the enumeration order; what the user types to select it
    pub index: usize,
    pub name: String,
    pub max_input_channels: u16,
    pub is_default: bool,
}

/// Port for keyboard-controlled audio capture.
///
/// One implementation instance corresponds to one recorder: it owns the
/// state cell and the frame buffer shared with the backend callback.
#[async_trait]
pub trait Capture: Send + Sync {
    /// Enumerate devices exposing at least one input channel.
    fn devices(&self) -> Result<Vec<InputDeviceInfo>, CaptureError>;

    /// Open the capture stream on the given device and transition
    /// Idle -> Recording. Valid only from Idle.
    async fn start(&self, device_index: usize) -> Result<(), CaptureError>;

    /// Flip Recording <-> Paused and return the new state.
    /// No-op from any other state.
    fn toggle_pause(&self) -> RecorderState;

    /// Close the stream (synchronously, so no further callbacks fire),
    /// transition to Stopped, and hand back the retained frames.
    /// The frame buffer is left empty afterwards.
    async fn stop(&self) -> Result<Recording, CaptureError>;

    /// Current recorder state
    fn state(&self) -> RecorderState;

    /// Elapsed wall-clock time since start, in milliseconds
    fn elapsed_ms(&self) -> u64;
}
