//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, the terminal, and the filesystem.

pub mod capture;
pub mod config;
pub mod keys;
pub mod wav;

// Re-export adapters
pub use capture::CpalCapture;
pub use config::XdgConfigStore;
pub use keys::CrosstermKeys;
pub use wav::WavSink;
