//! Main app runner for a recording session

use std::io;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::ports::{Capture, ConfigStore, InputDeviceInfo};
use crate::application::{RecordCallbacks, RecordInput, RecordSessionUseCase};
use crate::domain::config::AppConfig;
use crate::domain::error::SelectionError;
use crate::infrastructure::{CpalCapture, CrosstermKeys, WavSink, XdgConfigStore};

use super::args::RecordOptions;
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Run one interactive recording session
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let presenter = Arc::new(Presenter::new());

    let capture = CpalCapture::new();
    let devices = match capture.devices() {
        Ok(devices) => devices,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if devices.is_empty() {
        presenter.error("No input devices found");
        return ExitCode::from(EXIT_ERROR);
    }

    let device_index = match options.device {
        Some(index) => {
            let index = index as usize;
            if !devices.iter().any(|d| d.index == index) {
                presenter.error(&format!(
                    "Device index {} is not in the input device list",
                    index
                ));
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
            index
        }
        None => {
            print_device_list(&presenter, &devices);
            match prompt_for_device(&presenter, &devices).await {
                Ok(index) => index,
                Err(e) => {
                    presenter.error(&e);
                    return ExitCode::from(EXIT_ERROR);
                }
            }
        }
    };

    let device_name = devices
        .iter()
        .find(|d| d.index == device_index)
        .map(|d| d.name.as_str())
        .unwrap_or("unknown");
    presenter.info(&format!(
        "Using input device [{}] {}",
        device_index, device_name
    ));

    // Raw mode goes on only after the selection prompt, which needs
    // ordinary line-buffered input.
    let keys = match CrosstermKeys::new() {
        Ok(keys) => keys,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut use_case = RecordSessionUseCase::new(capture, keys, WavSink::new());

    let shutdown = ShutdownSignal::with_flag(use_case.shutdown_flag());
    if let Err(e) = shutdown.setup().await {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.start_spinner("Recording... 00:00  (space: pause/resume, q: stop)");

    let paused = Arc::new(AtomicBool::new(false));
    let paused_on = Arc::clone(&paused);
    let paused_off = Arc::clone(&paused);
    let paused_tick = Arc::clone(&paused);
    let presenter_tick = Arc::clone(&presenter);

    let callbacks = RecordCallbacks {
        on_started: None,
        on_paused: Some(Box::new(move || paused_on.store(true, Ordering::SeqCst))),
        on_resumed: Some(Box::new(move || paused_off.store(false, Ordering::SeqCst))),
        on_tick: Some(Arc::new(move |elapsed_ms| {
            if paused_tick.load(Ordering::SeqCst) {
                presenter_tick.update_paused_progress(elapsed_ms);
            } else {
                presenter_tick.update_recording_progress(elapsed_ms);
            }
        })),
    };

    let input = RecordInput {
        device_index,
        output: options.output.clone(),
    };

    let result = use_case.execute(input, callbacks).await;

    // Dropping the use case drops the key source, which restores the
    // terminal before the summary prints.
    drop(use_case);

    match result {
        Ok(output) => {
            match output.report {
                Some(report) => {
                    presenter
                        .spinner_success(&format!("Recording saved to {}", report.path.display()));
                    if output.interrupted {
                        presenter.info("Interrupted; saved what was captured");
                    }
                    presenter.info(&format!(
                        "{:.2} s of audio in {} frames",
                        report.duration_secs, output.frame_count
                    ));
                }
                None => {
                    presenter.stop_spinner();
                    presenter.warn("No audio captured; nothing was written");
                }
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.stop_spinner();
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// List input devices and exit
pub fn list_devices(presenter: &Presenter) -> ExitCode {
    let capture = CpalCapture::new();
    match capture.devices() {
        Ok(devices) if devices.is_empty() => {
            presenter.error("No input devices found");
            ExitCode::from(EXIT_ERROR)
        }
        Ok(devices) => {
            print_device_list(presenter, &devices);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Load and merge configuration from file and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    // Merge: defaults < file < cli
    AppConfig::defaults().merge(file_config).merge(cli_config)
}

fn print_device_list(presenter: &Presenter, devices: &[InputDeviceInfo]) {
    presenter.output("Available input devices:");
    for device in devices {
        let default_marker = if device.is_default { " (default)" } else { "" };
        presenter.output(&format!(
            "  [{}] {} ({} ch){}",
            device.index, device.name, device.max_input_channels, default_marker
        ));
    }
}

/// Prompt until the user enters a valid device index
async fn prompt_for_device(
    presenter: &Presenter,
    devices: &[InputDeviceInfo],
) -> Result<usize, String> {
    loop {
        presenter.output_inline("Select input device: ");

        let line = tokio::task::spawn_blocking(read_line_blocking)
            .await
            .map_err(|e| format!("stdin task failed: {}", e))??;

        let line = match line {
            Some(line) => line,
            None => return Err("stdin closed before a device was selected".to_string()),
        };

        match parse_selection(&line, devices) {
            Ok(index) => return Ok(index),
            Err(e) => presenter.error(&e.to_string()),
        }
    }
}

fn read_line_blocking() -> Result<Option<String>, String> {
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(buf)),
        Err(e) => Err(format!("Failed to read stdin: {}", e)),
    }
}

/// Parse a device selection entered at the prompt.
///
/// The listed indices keep their enumeration positions, which can have
/// gaps when a device exposes no input channels. A selection is valid only
/// if it matches an index that was actually listed; anything else is a
/// `SelectionError` and the caller re-prompts.
pub fn parse_selection(input: &str, devices: &[InputDeviceInfo]) -> Result<usize, SelectionError> {
    let trimmed = input.trim();
    let invalid = || SelectionError {
        input: trimmed.to_string(),
    };

    let index: usize = trimmed.parse().map_err(|_| invalid())?;
    if !devices.iter().any(|d| d.index == index) {
        return Err(invalid());
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(index: usize) -> InputDeviceInfo {
        InputDeviceInfo {
            index,
            name: format!("mic-{}", index),
            max_input_channels: 1,
            is_default: index == 0,
        }
    }

    fn listed(indices: &[usize]) -> Vec<InputDeviceInfo> {
        indices.iter().map(|&i| device(i)).collect()
    }

    #[test]
    fn parse_selection_accepts_listed_index() {
        let devices = listed(&[0, 1, 2]);
        assert_eq!(parse_selection("0", &devices).unwrap(), 0);
        assert_eq!(parse_selection("2", &devices).unwrap(), 2);
    }

    #[test]
    fn parse_selection_trims_whitespace() {
        assert_eq!(parse_selection(" 1 \n", &listed(&[0, 1, 2])).unwrap(), 1);
    }

    #[test]
    fn parse_selection_accepts_gapped_enumeration_indices() {
        // A device with no input channels leaves a hole in the listing;
        // the displayed index must still be selectable
        let devices = listed(&[0, 2]);
        assert_eq!(parse_selection("2", &devices).unwrap(), 2);
        assert_eq!(parse_selection("0", &devices).unwrap(), 0);
    }

    #[test]
    fn parse_selection_rejects_unlisted_index_in_a_gap() {
        let devices = listed(&[0, 2]);
        assert!(parse_selection("1", &devices).is_err());
    }

    #[test]
    fn parse_selection_rejects_non_numeric() {
        let err = parse_selection("abc", &listed(&[0, 1, 2])).unwrap_err();
        assert_eq!(err.input, "abc");
    }

    #[test]
    fn parse_selection_rejects_negative() {
        assert!(parse_selection("-1", &listed(&[0, 1, 2])).is_err());
    }

    #[test]
    fn parse_selection_rejects_out_of_range() {
        let devices = listed(&[0, 1, 2]);
        assert!(parse_selection("999", &devices).is_err());
        assert!(parse_selection("3", &devices).is_err());
    }

    #[test]
    fn parse_selection_rejects_empty() {
        let devices = listed(&[0, 1, 2]);
        assert!(parse_selection("", &devices).is_err());
        assert!(parse_selection("\n", &devices).is_err());
    }

    #[test]
    fn selection_error_names_the_input() {
        let err = parse_selection("999", &listed(&[0, 1])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("999"));
        assert!(message.contains("Invalid selection"));
    }
}
