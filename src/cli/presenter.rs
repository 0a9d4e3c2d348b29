//! CLI presenter for output formatting

use std::io::{self, Write};
use std::sync::Mutex;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Presenter for CLI output formatting.
///
/// The spinner lives behind a mutex so session callbacks running on other
/// tasks can update it through a shared reference.
pub struct Presenter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    /// Start a spinner with message
    pub fn start_spinner(&self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(spinner);
        }
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Ok(slot) = self.spinner.lock() {
            if let Some(ref spinner) = *slot {
                spinner.set_message(message.to_string());
            }
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&self, message: &str) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_with_message(format!("{} {}", "✓".green(), message));
            }
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Output text to stdout without newline
    pub fn output_inline(&self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    /// Format elapsed recording time as mm:ss
    pub fn format_elapsed(&self, elapsed_ms: u64) -> String {
        let total_secs = elapsed_ms / 1000;
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }

    /// Update recording spinner with elapsed time
    pub fn update_recording_progress(&self, elapsed_ms: u64) {
        self.update_spinner(&format!(
            "Recording... {}  (space: pause/resume, q: stop)",
            self.format_elapsed(elapsed_ms)
        ));
    }

    /// Update spinner while paused
    pub fn update_paused_progress(&self, elapsed_ms: u64) {
        self.update_spinner(&format!(
            "Paused at {}  (space: resume, q: stop)",
            self.format_elapsed(elapsed_ms)
        ));
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_elapsed_under_a_minute() {
        let presenter = Presenter::new();
        assert_eq!(presenter.format_elapsed(0), "00:00");
        assert_eq!(presenter.format_elapsed(5_400), "00:05");
    }

    #[test]
    fn format_elapsed_over_a_minute() {
        let presenter = Presenter::new();
        assert_eq!(presenter.format_elapsed(61_000), "01:01");
        assert_eq!(presenter.format_elapsed(600_000), "10:00");
    }

    #[test]
    fn spinner_updates_are_ignored_when_inactive() {
        let presenter = Presenter::new();
        // No spinner started; must not panic
        presenter.update_recording_progress(1_000);
        presenter.spinner_success("done");
        presenter.stop_spinner();
    }
}
