//! WAV output integration tests
//!
//! Exercises the sink through the public library API with realistic
//! frame payloads.

use std::fs;

use micrec::application::ports::AudioSink;
use micrec::domain::recording::frames::{CHANNELS, CHUNK_SAMPLES, TARGET_SAMPLE_RATE};
use micrec::domain::recording::Recording;
use micrec::infrastructure::WavSink;

fn tone_frames(count: usize) -> Vec<Vec<i16>> {
    (0..count)
        .map(|frame| {
            (0..CHUNK_SAMPLES)
                .map(|i| (((frame * CHUNK_SAMPLES + i) % 128) as i16 - 64) * 100)
                .collect()
        })
        .collect()
}

fn recording(frames: Vec<Vec<i16>>) -> Recording {
    Recording::new(frames, TARGET_SAMPLE_RATE, CHANNELS)
}

#[tokio::test]
async fn saving_the_same_recording_twice_produces_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.wav");
    let second = dir.path().join("second.wav");

    let sink = WavSink::new();
    sink.save(&first, recording(tone_frames(8))).await.unwrap();
    sink.save(&second, recording(tone_frames(8))).await.unwrap();

    let bytes_a = fs::read(&first).unwrap();
    let bytes_b = fs::read(&second).unwrap();
    assert_eq!(bytes_a, bytes_b);
}

#[tokio::test]
async fn sixty_four_chunks_read_back_as_roughly_three_seconds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("three_seconds.wav");

    let report = WavSink::new()
        .save(&path, recording(tone_frames(64)))
        .await
        .unwrap();

    // 64 * 2048 samples at 44.1 kHz
    assert!((report.duration_secs - 2.972).abs() < 0.01);

    let reader = hound::WavReader::open(&path).unwrap();
    let read_duration = reader.duration() as f64 / reader.spec().sample_rate as f64;
    assert!((read_duration - report.duration_secs).abs() < 1e-9);
}

#[tokio::test]
async fn samples_survive_the_write_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.wav");

    let frames = tone_frames(2);
    let expected: Vec<i16> = frames.iter().flatten().copied().collect();

    WavSink::new().save(&path, recording(frames)).await.unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read, expected);
}

#[tokio::test]
async fn empty_session_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.wav");

    let result = WavSink::new().save(&path, recording(Vec::new())).await;

    assert!(result.is_err());
    assert!(!path.exists());
}
