//! Recorder state machine
//!
//! `Idle -> Recording <-> Paused -> Stopped`. The state is the only gate
//! deciding whether frames delivered by the capture callback are retained,
//! so it is shared between the control thread and the callback thread
//! through [`StateCell`].

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Recording session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecorderState {
    /// Created, capture stream not opened yet
    Idle = 0,
    /// Capturing; incoming frames are retained
    Recording = 1,
    /// Stream open but incoming frames are discarded
    Paused = 2,
    /// Terminal; stream closed, frames handed off for saving
    Stopped = 3,
}

impl RecorderState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Recording,
            2 => Self::Paused,
            3 => Self::Stopped,
            _ => Self::Idle,
        }
    }

    /// Whether the capture stream should be open in this state
    pub fn is_active(self) -> bool {
        matches!(self, Self::Recording | Self::Paused)
    }

    /// Result of a pause toggle. No-op outside Recording/Paused.
    pub fn toggled(self) -> Self {
        match self {
            Self::Recording => Self::Paused,
            Self::Paused => Self::Recording,
            other => other,
        }
    }

    /// Whether `start()` is a valid transition from this state
    pub fn can_start(self) -> bool {
        self == Self::Idle
    }

    /// Whether `stop()` is a valid transition from this state
    pub fn can_stop(self) -> bool {
        self.is_active()
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

/// Atomic cell holding the current [`RecorderState`].
///
/// Written by the control thread, read by the capture callback. A plain
/// load/store is enough: there is a single writer, and the callback only
/// needs visibility, not read-modify-write.
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(RecorderState::Idle as u8))
    }

    pub fn load(&self) -> RecorderState {
        RecorderState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub fn store(&self, state: RecorderState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Flip Recording <-> Paused and return the new state.
    /// Any other state is left untouched.
    pub fn toggle_pause(&self) -> RecorderState {
        let next = self.load().toggled();
        self.store(next);
        next
    }

    /// Transition `from -> to` atomically; false if the state was no
    /// longer `from`. Lets a slow startup detect that the session was
    /// abandoned while it was still setting up.
    pub fn try_transition(&self, from: RecorderState, to: RecorderState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle() {
        let cell = StateCell::new();
        assert_eq!(cell.load(), RecorderState::Idle);
    }

    #[test]
    fn toggle_flips_recording_and_paused() {
        let cell = StateCell::new();
        cell.store(RecorderState::Recording);
        assert_eq!(cell.toggle_pause(), RecorderState::Paused);
        assert_eq!(cell.toggle_pause(), RecorderState::Recording);
    }

    #[test]
    fn toggle_is_noop_from_idle_and_stopped() {
        let cell = StateCell::new();
        assert_eq!(cell.toggle_pause(), RecorderState::Idle);

        cell.store(RecorderState::Stopped);
        assert_eq!(cell.toggle_pause(), RecorderState::Stopped);
    }

    #[test]
    fn try_transition_succeeds_from_expected_state() {
        let cell = StateCell::new();
        assert!(cell.try_transition(RecorderState::Idle, RecorderState::Recording));
        assert_eq!(cell.load(), RecorderState::Recording);
    }

    #[test]
    fn try_transition_fails_when_state_moved_on() {
        // A startup abandoned by its caller parks the state at Stopped;
        // the late Idle -> Recording transition must then fail
        let cell = StateCell::new();
        cell.store(RecorderState::Stopped);
        assert!(!cell.try_transition(RecorderState::Idle, RecorderState::Recording));
        assert_eq!(cell.load(), RecorderState::Stopped);
    }

    #[test]
    fn start_only_valid_from_idle() {
        assert!(RecorderState::Idle.can_start());
        assert!(!RecorderState::Recording.can_start());
        assert!(!RecorderState::Paused.can_start());
        assert!(!RecorderState::Stopped.can_start());
    }

    #[test]
    fn stop_valid_from_recording_and_paused() {
        assert!(RecorderState::Recording.can_stop());
        assert!(RecorderState::Paused.can_stop());
        assert!(!RecorderState::Idle.can_stop());
        assert!(!RecorderState::Stopped.can_stop());
    }

    #[test]
    fn active_states() {
        assert!(RecorderState::Recording.is_active());
        assert!(RecorderState::Paused.is_active());
        assert!(!RecorderState::Idle.is_active());
        assert!(!RecorderState::Stopped.is_active());
    }

    #[test]
    fn display_names() {
        assert_eq!(RecorderState::Recording.to_string(), "recording");
        assert_eq!(RecorderState::Paused.to_string(), "paused");
    }
}
