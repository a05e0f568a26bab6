//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

use crate::domain::audio::MimeType;
use crate::domain::recording::Duration;

/// voice-memo - record a voice memo, play it back, clear it
#[derive(Parser, Debug)]
#[command(name = "voice-memo")]
#[command(version)]
#[command(about = "Minimal voice recorder: record, stop, play back, clear")]
#[command(long_about = None)]
pub struct Cli {
    /// Auto-stop a recording after this long (e.g., 30s, 5m, 2m30s)
    #[arg(short = 'm', long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Encoding priority, comma-separated (e.g., audio/ogg;codecs=opus,audio/wav)
    #[arg(short = 'p', long, value_name = "MIME,...")]
    pub prefer: Option<String>,

    /// Encoding sample rate in Hz (8000-48000)
    #[arg(short = 'r', long, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Input device name (default: host default input)
    #[arg(short = 'd', long, value_name = "NAME", env = "VOICE_MEMO_DEVICE")]
    pub device: Option<String>,

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
    /// List available input devices
    Devices,
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

/// Resolved options for an interactive session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub max_duration: Duration,
    pub preferred_types: Vec<MimeType>,
    pub sample_rate: u32,
    pub input_device: Option<String>,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] =
    &["preferred_types", "sample_rate", "max_duration", "input_device"];

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
        let cli = Cli::parse_from(["voice-memo"]);
        assert!(cli.max_duration.is_none());
        assert!(cli.prefer.is_none());
        assert!(cli.sample_rate.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_session_options() {
        let cli = Cli::parse_from([
            "voice-memo",
            "--max-duration",
            "2m",
            "--prefer",
            "audio/wav,audio/flac",
            "-r",
            "22050",
            "--device",
            "USB Mic",
        ]);
        assert_eq!(cli.max_duration.as_deref(), Some("2m"));
        assert_eq!(cli.prefer.as_deref(), Some("audio/wav,audio/flac"));
        assert_eq!(cli.sample_rate, Some(22_050));
        assert_eq!(cli.device.as_deref(), Some("USB Mic"));
    }

    #[test]
    fn cli_rejects_non_numeric_sample_rate() {
        assert!(Cli::try_parse_from(["voice-memo", "--sample-rate", "fast"]).is_err());
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::parse_from(["voice-memo", "config", "init"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Init
            })
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["voice-memo", "config", "set", "sample_rate", "44100"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "sample_rate");
            assert_eq!(value, "44100");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn cli_parses_devices() {
        let cli = Cli::parse_from(["voice-memo", "devices"]);
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("preferred_types"));
        assert!(is_valid_config_key("max_duration"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
