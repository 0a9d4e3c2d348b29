//! micrec - interactive microphone recorder CLI
//!
//! Records microphone audio into memory and writes it to a WAV file when
//! the session stops. Pause and resume from the keyboard; Ctrl-C saves
//! what was captured instead of discarding it.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Recorder state machine, frame buffer, config, and errors
//! - **Application**: The record session use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, hound, crossterm, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
