//! WAV output module

mod sink;

pub use sink::WavSink;
