//! Frame buffer value objects
//!
//! A [`Frame`] is one chunk of mono i16 samples delivered by a single
//! capture callback invocation. The [`FrameBuffer`] keeps frames in arrival
//! order and is append-only for the lifetime of a session.

use std::sync::Mutex;

use super::state::{RecorderState, StateCell};

/// Nominal samples per capture chunk
pub const CHUNK_SAMPLES: usize = 2048;

/// Target output sample rate (Hz)
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Output channel count (mono)
pub const CHANNELS: u16 = 1;

/// One captured chunk of mono i16 samples
pub type Frame = Vec<i16>;

/// Append-only ordered sequence of captured frames
#[derive(Debug, Default)]
pub struct FrameBuffer {
    frames: Vec<Frame>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn total_samples(&self) -> usize {
        self.frames.iter().map(|f| f.len()).sum()
    }

    /// Move all frames out, leaving the buffer empty (re-armed)
    pub fn take(&mut self) -> Vec<Frame> {
        std::mem::take(&mut self.frames)
    }
}

/// The capture callback gate: append the chunk iff the state is exactly
/// `Recording`. Chunks arriving while paused, idle, or stopped are dropped
/// on the floor, which is the intended behavior rather than an error.
///
/// This is the only work the callback is allowed to do. It must stay
/// bounded: a state load, a lock, and a push.
pub fn append_if_recording(state: &StateCell, frames: &Mutex<FrameBuffer>, chunk: &[i16]) {
    if state.load() != RecorderState::Recording {
        return;
    }
    if let Ok(mut buffer) = frames.lock() {
        buffer.push(chunk.to_vec());
    }
}

/// Finalized capture output: the retained frames plus the format needed to
/// serialize them. Produced by `stop()` after the stream is closed.
#[derive(Debug, Clone)]
pub struct Recording {
    pub frames: Vec<Frame>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Recording {
    pub fn new(frames: Vec<Frame>, sample_rate: u32, channels: u16) -> Self {
        Self {
            frames,
            sample_rate,
            channels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn total_samples(&self) -> usize {
        self.frames.iter().map(|f| f.len()).sum()
    }

    /// Duration in seconds: total samples / sample rate
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.total_samples() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// All samples concatenated in arrival order
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.frames.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(value: i16) -> Frame {
        vec![value; CHUNK_SAMPLES]
    }

    #[test]
    fn buffer_preserves_arrival_order() {
        let mut buffer = FrameBuffer::new();
        buffer.push(vec![1, 2]);
        buffer.push(vec![3, 4]);
        let frames = buffer.take();
        assert_eq!(frames, vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn take_rearms_the_buffer() {
        let mut buffer = FrameBuffer::new();
        buffer.push(vec![0; 4]);
        assert_eq!(buffer.len(), 1);
        let _ = buffer.take();
        assert!(buffer.is_empty());
    }

    #[test]
    fn gate_appends_only_while_recording() {
        let state = StateCell::new();
        let frames = Mutex::new(FrameBuffer::new());

        // Idle: discarded
        append_if_recording(&state, &frames, &chunk(1));
        assert_eq!(frames.lock().unwrap().len(), 0);

        // Recording: retained
        state.store(RecorderState::Recording);
        append_if_recording(&state, &frames, &chunk(2));
        assert_eq!(frames.lock().unwrap().len(), 1);

        // Paused: discarded
        state.store(RecorderState::Paused);
        append_if_recording(&state, &frames, &chunk(3));
        assert_eq!(frames.lock().unwrap().len(), 1);

        // Stopped: discarded
        state.store(RecorderState::Stopped);
        append_if_recording(&state, &frames, &chunk(4));
        assert_eq!(frames.lock().unwrap().len(), 1);
    }

    #[test]
    fn pause_resume_retains_half_the_chunks() {
        // start -> pause -> 10 chunks (discarded) -> resume -> 10 chunks
        // (retained) -> stop => buffer length 10, not 20
        let state = StateCell::new();
        let frames = Mutex::new(FrameBuffer::new());

        state.store(RecorderState::Recording);
        state.toggle_pause();
        for _ in 0..10 {
            append_if_recording(&state, &frames, &chunk(0));
        }
        state.toggle_pause();
        for _ in 0..10 {
            append_if_recording(&state, &frames, &chunk(0));
        }
        state.store(RecorderState::Stopped);

        assert_eq!(frames.lock().unwrap().len(), 10);
    }

    #[test]
    fn arbitrary_toggle_sequence_only_retains_recording_chunks() {
        let state = StateCell::new();
        let frames = Mutex::new(FrameBuffer::new());
        state.store(RecorderState::Recording);

        let mut expected = 0;
        for i in 0..50 {
            if i % 7 == 0 {
                state.toggle_pause();
            }
            if state.load() == RecorderState::Recording {
                expected += 1;
            }
            append_if_recording(&state, &frames, &chunk(0));
        }

        assert_eq!(frames.lock().unwrap().len(), expected);
    }

    #[test]
    fn duration_is_samples_over_rate() {
        // 64 chunks of 2048 samples at 44100Hz ~= 2.97s
        let frames: Vec<Frame> = (0..64).map(|_| chunk(0)).collect();
        let recording = Recording::new(frames, TARGET_SAMPLE_RATE, CHANNELS);
        let expected = 64.0 * CHUNK_SAMPLES as f64 / TARGET_SAMPLE_RATE as f64;
        assert!((recording.duration_secs() - expected).abs() < 1e-9);
        assert!((recording.duration_secs() - 2.97).abs() < 0.01);
    }

    #[test]
    fn empty_recording_has_zero_duration() {
        let recording = Recording::new(Vec::new(), TARGET_SAMPLE_RATE, CHANNELS);
        assert!(recording.is_empty());
        assert_eq!(recording.duration_secs(), 0.0);
    }

    #[test]
    fn samples_concatenate_in_order() {
        let recording = Recording::new(vec![vec![1, 2], vec![3]], TARGET_SAMPLE_RATE, CHANNELS);
        let all: Vec<i16> = recording.samples().collect();
        assert_eq!(all, vec![1, 2, 3]);
        assert_eq!(recording.total_samples(), 3);
    }
}
