//! Recording domain: state machine and frame buffer

pub mod frames;
pub mod state;

pub use frames::{append_if_recording, Frame, FrameBuffer, Recording};
pub use state::{RecorderState, StateCell};
