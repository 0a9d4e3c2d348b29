//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// micrec - interactive microphone recorder
#[derive(Parser, Debug)]
#[command(name = "micrec")]
#[command(version)]
#[command(about = "Record microphone audio to a WAV file")]
#[command(long_about = None)]
pub struct Cli {
    /// Input device index (skips the interactive prompt)
    #[arg(short = 'd', long, value_name = "INDEX")]
    pub device: Option<u32>,

    /// Output WAV path
    #[arg(short = 'o', long, value_name = "PATH", env = "MICREC_OUTPUT")]
    pub output: Option<String>,

    /// List input devices and exit
    #[arg(short = 'l', long)]
    pub list_devices: bool,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Resolved recording options (CLI over config file over defaults)
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub device: Option<u32>,
    pub output: PathBuf,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &["output", "device"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["micrec"]);
        assert!(cli.device.is_none());
        assert!(cli.output.is_none());
        assert!(!cli.list_devices);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_device_index() {
        let cli = Cli::parse_from(["micrec", "-d", "2"]);
        assert_eq!(cli.device, Some(2));
    }

    #[test]
    fn cli_parses_output_path() {
        let cli = Cli::parse_from(["micrec", "--output", "take.wav"]);
        assert_eq!(cli.output, Some("take.wav".to_string()));
    }

    #[test]
    fn cli_parses_list_devices() {
        let cli = Cli::parse_from(["micrec", "--list-devices"]);
        assert!(cli.list_devices);
    }

    #[test]
    fn cli_rejects_non_numeric_device() {
        let result = Cli::try_parse_from(["micrec", "-d", "abc"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::parse_from(["micrec", "config", "init"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Init
            })
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["micrec", "config", "set", "output", "take.wav"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "output");
            assert_eq!(value, "take.wav");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("output"));
        assert!(is_valid_config_key("device"));
        assert!(!is_valid_config_key("invalid_key"));
    }

    #[test]
    fn verify_cli() {
        // Verify the CLI definition is valid
        Cli::command().debug_assert();
    }
}
