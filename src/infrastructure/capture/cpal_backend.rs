//! Cross-platform audio capture using cpal
//!
//! Targets the output format directly where possible:
//! - 44.1kHz sample rate (or resampling from the device rate on stop)
//! - Mono (stereo devices are mixed down per chunk)
//! - 16-bit signed samples
//!
//! The stream is owned by a background thread because cpal::Stream is not
//! thread-safe. `stop()` parks the state at Stopped and joins that thread,
//! which drops the stream, before the frame buffer is read.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};

use crate::application::ports::{Capture, CaptureError, InputDeviceInfo};
use crate::domain::recording::frames::{CHANNELS, CHUNK_SAMPLES, TARGET_SAMPLE_RATE};
use crate::domain::recording::{append_if_recording, FrameBuffer, RecorderState, Recording, StateCell};

/// How long `start()` waits for the stream thread to come up
const START_TIMEOUT: Duration = Duration::from_secs(2);

/// cpal-backed capture adapter
pub struct CpalCapture {
    /// Shared with the capture callback; the only retention gate
    state: Arc<StateCell>,
    /// Retained frames (mono, i16, at the device sample rate)
    frames: Arc<StdMutex<FrameBuffer>>,
    /// Device sample rate (may differ from the 44.1kHz target)
    device_sample_rate: Arc<AtomicU32>,
    /// Elapsed wall-clock time since start, in milliseconds
    elapsed_ms: Arc<AtomicU64>,
    /// Thread owning the open stream; joined by stop()
    worker: StdMutex<Option<std::thread::JoinHandle<()>>>,
}

impl CpalCapture {
    pub fn new() -> Self {
        Self {
            state: Arc::new(StateCell::new()),
            frames: Arc::new(StdMutex::new(FrameBuffer::new())),
            device_sample_rate: Arc::new(AtomicU32::new(0)),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            worker: StdMutex::new(None),
        }
    }

    /// Resolve a device by its enumeration index
    fn get_device(index: usize) -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        let mut devices = host
            .input_devices()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        devices
            .nth(index)
            .ok_or_else(|| CaptureError::DeviceUnavailable(format!("no device at index {}", index)))
    }

    /// Get a suitable input configuration for a device
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| CaptureError::StartFailed(format!("Failed to get configs: {}", e)))?;

        // Prefer mono and configs that can run at the 44.1kHz target
        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > TARGET_SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config
            .ok_or_else(|| CaptureError::StartFailed("No suitable config found".into()))?;

        // Use the target rate if supported, otherwise the device minimum
        // (stop() resamples in that case)
        let sample_rate = if config_range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && config_range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            config_range.min_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Mix interleaved multi-channel samples down to mono
    fn mix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels <= 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    /// Resample mono samples from the device rate to 44.1kHz
    fn resample_to_target(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, CaptureError> {
        if source_rate == TARGET_SAMPLE_RATE {
            return Ok(samples.to_vec());
        }

        let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

        let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
        let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

        let mut resampler = FftFixedIn::<f32>::new(
            source_rate as usize,
            TARGET_SAMPLE_RATE as usize,
            1024, // Chunk size
            2,    // Sub-chunks
            1,    // Mono
        )
        .map_err(|e| CaptureError::StreamFailed(format!("Resampler init failed: {}", e)))?;

        let mut output = Vec::with_capacity(output_len);
        let mut input_pos = 0;

        while input_pos < samples_f32.len() {
            let frames_needed = resampler.input_frames_next();
            let end_pos = (input_pos + frames_needed).min(samples_f32.len());
            let mut chunk = samples_f32[input_pos..end_pos].to_vec();

            // Pad the tail chunk
            if chunk.len() < frames_needed {
                chunk.resize(frames_needed, 0.0);
            }

            let resampled = resampler
                .process(&[chunk], None)
                .map_err(|e| CaptureError::StreamFailed(format!("Resampling failed: {}", e)))?;

            output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
            input_pos = end_pos;
        }

        output.truncate(output_len);

        Ok(output)
    }

    /// Build the input stream for the thread that owns it
    fn build_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        sample_format: SampleFormat,
        state: Arc<StateCell>,
        frames: Arc<StdMutex<FrameBuffer>>,
    ) -> Result<cpal::Stream, CaptureError> {
        let channels = config.channels;
        let err_fn = |err| eprintln!("Audio stream error: {}", err);

        let stream = match sample_format {
            SampleFormat::I16 => device
                .build_input_stream(
                    config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let mono = CpalCapture::mix_to_mono(data, channels);
                        append_if_recording(&state, &frames, &mono);
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?,

            SampleFormat::F32 => device
                .build_input_stream(
                    config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let i16_data: Vec<i16> =
                            data.iter().map(|&s| (s * 32767.0) as i16).collect();
                        let mono = CpalCapture::mix_to_mono(&i16_data, channels);
                        append_if_recording(&state, &frames, &mono);
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?,

            other => {
                return Err(CaptureError::StartFailed(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        };

        Ok(stream)
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Capture for CpalCapture {
    fn devices(&self) -> Result<Vec<InputDeviceInfo>, CaptureError> {
        let host = cpal::default_host();
        let default_name = host
            .default_input_device()
            .and_then(|d| d.name().ok())
            .unwrap_or_default();

        let devices = host
            .input_devices()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        let mut infos = Vec::new();
        for (index, device) in devices.enumerate() {
            let name = device.name().unwrap_or_else(|_| "Unknown Device".to_string());

            // Only list devices exposing at least one input channel
            let max_input_channels = match device.supported_input_configs() {
                Ok(configs) => configs.map(|c| c.channels()).max().unwrap_or(0),
                Err(_) => 0,
            };
            if max_input_channels == 0 {
                continue;
            }

            infos.push(InputDeviceInfo {
                index,
                is_default: name == default_name,
                name,
                max_input_channels,
            });
        }

        if infos.is_empty() {
            return Err(CaptureError::NoInputDevice);
        }

        Ok(infos)
    }

    async fn start(&self, device_index: usize) -> Result<(), CaptureError> {
        let current = self.state.load();
        if !current.can_start() {
            return Err(CaptureError::InvalidState {
                action: "start",
                state: current,
            });
        }

        let state = Arc::clone(&self.state);
        let frames = Arc::clone(&self.frames);
        let device_sample_rate = Arc::clone(&self.device_sample_rate);
        let elapsed_ms = Arc::clone(&self.elapsed_ms);

        // The thread reports stream startup through this channel, then owns
        // the stream until the state leaves Recording/Paused.
        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, CaptureError>>();

        let handle = std::thread::spawn(move || {
            let setup = (|| {
                let device = CpalCapture::get_device(device_index)?;
                let (config, sample_format) = CpalCapture::get_input_config(&device)?;
                let stream = CpalCapture::build_stream(
                    &device,
                    &config,
                    sample_format,
                    Arc::clone(&state),
                    frames,
                )?;
                stream
                    .play()
                    .map_err(|e| CaptureError::StartFailed(e.to_string()))?;
                Ok((stream, config.sample_rate.0))
            })();

            let (stream, sample_rate) = match setup {
                Ok(ok) => ok,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            // The caller may have given up on a slow startup and parked
            // the state at Stopped; only a successful Idle -> Recording
            // transition keeps the stream alive.
            if !state.try_transition(RecorderState::Idle, RecorderState::Recording) {
                let _ = ready_tx.send(Err(CaptureError::StartFailed(
                    "startup cancelled".into(),
                )));
                drop(stream);
                return;
            }

            device_sample_rate.store(sample_rate, Ordering::SeqCst);
            let _ = ready_tx.send(Ok(sample_rate));

            let started = Instant::now();
            while state.load().is_active() {
                elapsed_ms.store(started.elapsed().as_millis() as u64, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(50));
            }

            // Dropping the stream closes it; no callback fires after this
            drop(stream);
        });

        *self.worker.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);

        let startup = tokio::task::spawn_blocking(move || ready_rx.recv_timeout(START_TIMEOUT))
            .await
            .map_err(|e| CaptureError::StartFailed(format!("startup task failed: {}", e)))?;

        match startup {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => {
                // The thread reported failure and has already returned;
                // reap it so no handle is left behind
                self.state.store(RecorderState::Stopped);
                let handle = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
                if let Some(handle) = handle {
                    let _ = tokio::task::spawn_blocking(move || handle.join()).await;
                }
                Err(e)
            }
            Err(_) => {
                // Startup timed out. Park the state at Stopped so the
                // worker's Idle -> Recording transition fails when setup
                // eventually returns and it drops the stream itself. The
                // thread may still be blocked inside the audio backend,
                // so it cannot be joined here.
                self.state.store(RecorderState::Stopped);
                let _ = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
                Err(CaptureError::StartFailed(
                    "timed out waiting for the capture stream".into(),
                ))
            }
        }
    }

    fn toggle_pause(&self) -> RecorderState {
        self.state.toggle_pause()
    }

    async fn stop(&self) -> Result<Recording, CaptureError> {
        let current = self.state.load();
        if !current.can_stop() {
            return Err(CaptureError::InvalidState {
                action: "stop",
                state: current,
            });
        }

        self.state.store(RecorderState::Stopped);

        // Join the stream thread. Once it returns, the stream is dropped
        // and the callback can no longer run, so reading the buffer below
        // cannot race a write.
        let handle = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            tokio::task::spawn_blocking(move || handle.join())
                .await
                .map_err(|e| CaptureError::StreamFailed(format!("join task failed: {}", e)))?
                .map_err(|_| CaptureError::StreamFailed("capture thread panicked".into()))?;
        }

        let frames = self
            .frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let device_rate = self.device_sample_rate.load(Ordering::SeqCst);
        if device_rate == TARGET_SAMPLE_RATE || frames.is_empty() {
            return Ok(Recording::new(frames, device_rate, CHANNELS));
        }

        // Device could not run at 44.1kHz: resample the whole take and
        // re-chunk it so downstream frame accounting stays meaningful
        let joined: Vec<i16> = frames.into_iter().flatten().collect();
        let resampled = tokio::task::spawn_blocking(move || {
            CpalCapture::resample_to_target(&joined, device_rate)
        })
        .await
        .map_err(|e| CaptureError::StreamFailed(format!("resample task failed: {}", e)))??;

        let rechunked = resampled
            .chunks(CHUNK_SAMPLES)
            .map(|c| c.to_vec())
            .collect();

        Ok(Recording::new(rechunked, TARGET_SAMPLE_RATE, CHANNELS))
    }

    fn state(&self) -> RecorderState {
        self.state.load()
    }

    fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms.load(Ordering::SeqCst)
    }
}
