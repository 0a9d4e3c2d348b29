//! Keyboard input port interface

use std::time::Duration;

use thiserror::Error;

/// Keyboard input errors
#[derive(Debug, Clone, Error)]
pub enum KeyInputError {
    #[error("Failed to read keyboard input: {0}")]
    ReadFailed(String),

    #[error("Failed to configure the terminal: {0}")]
    TerminalSetup(String),
}

/// Commands recognized during a recording session.
/// Every other key press is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Space: flip Recording <-> Paused
    TogglePause,
    /// 'q': stop and save
    Stop,
    /// Ctrl-C: stop and save, then exit
    Interrupt,
}

/// Port for a non-blocking "next key event" source.
///
/// Implementations may poll the terminal or drain a listener thread; either
/// way `poll` must return promptly (within `timeout`) so the control loop
/// observes key presses with sub-200ms latency and never drops a stop.
pub trait KeyInput: Send {
    /// Return the next pending command, or None if no relevant key was
    /// pressed within `timeout`.
    fn poll(&mut self, timeout: Duration) -> Result<Option<KeyCommand>, KeyInputError>;
}
