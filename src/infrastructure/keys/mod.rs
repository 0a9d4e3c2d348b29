//! Keyboard input module

mod crossterm_keys;

pub use crossterm_keys::CrosstermKeys;
