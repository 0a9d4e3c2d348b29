//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod keys;
pub mod sink;

// Re-export common types
pub use capture::{Capture, CaptureError, InputDeviceInfo, ProgressCallback};
pub use config::ConfigStore;
pub use keys::{KeyCommand, KeyInput, KeyInputError};
pub use sink::{AudioSink, SaveError, SaveReport};
