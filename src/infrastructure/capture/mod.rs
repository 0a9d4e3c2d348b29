//! Capture infrastructure module
//!
//! Cross-platform microphone capture using cpal. The capture stream runs on
//! a dedicated thread (cpal streams are not Send) and the callback does
//! nothing but the conditional frame append.

mod cpal_backend;

pub use cpal_backend::CpalCapture;
