//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default output file path
pub const DEFAULT_OUTPUT: &str = "output.wav";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output WAV path
    pub output: Option<String>,
    /// Preferred input device index; when unset the user is prompted
    pub device: Option<u32>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            output: Some(DEFAULT_OUTPUT.to_string()),
            device: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            output: other.output.or(self.output),
            device: other.device.or(self.device),
        }
    }

    /// Get the output path, or the default if not set
    pub fn output_or_default(&self) -> PathBuf {
        PathBuf::from(self.output.as_deref().unwrap_or(DEFAULT_OUTPUT))
    }
}
