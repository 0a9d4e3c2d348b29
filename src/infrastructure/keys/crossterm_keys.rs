//! Non-blocking terminal key source using crossterm
//!
//! Raw mode is enabled for the lifetime of the adapter so single key
//! presses arrive without Enter, and restored on drop. In raw mode Ctrl-C
//! is delivered as a key event instead of SIGINT, so it is mapped to
//! `KeyCommand::Interrupt` here.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::application::ports::{KeyCommand, KeyInput, KeyInputError};

/// crossterm-backed key source with a raw-mode guard
pub struct CrosstermKeys {
    _private: (),
}

impl CrosstermKeys {
    /// Enable raw mode and create the key source. Raw mode stays on until
    /// the value is dropped.
    pub fn new() -> Result<Self, KeyInputError> {
        terminal::enable_raw_mode().map_err(|e| KeyInputError::TerminalSetup(e.to_string()))?;
        Ok(Self { _private: () })
    }

    /// Map a key event to a session command. Unrecognized keys are None.
    fn map_key(key: KeyEvent) -> Option<KeyCommand> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char(' ') => Some(KeyCommand::TogglePause),
            KeyCode::Char('q') if key.modifiers.is_empty() => Some(KeyCommand::Stop),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(KeyCommand::Interrupt)
            }
            _ => None,
        }
    }
}

impl Drop for CrosstermKeys {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl KeyInput for CrosstermKeys {
    fn poll(&mut self, timeout: Duration) -> Result<Option<KeyCommand>, KeyInputError> {
        // Drain everything pending so a stop queued behind other key
        // presses is never lost
        loop {
            let pending = event::poll(timeout)
                .map_err(|e| KeyInputError::ReadFailed(e.to_string()))?;
            if !pending {
                return Ok(None);
            }

            let ev = event::read().map_err(|e| KeyInputError::ReadFailed(e.to_string()))?;
            if let Event::Key(key) = ev {
                if let Some(command) = Self::map_key(key) {
                    return Ok(Some(command));
                }
            }
            // Irrelevant event; keep draining without waiting again
        }
    }
}
