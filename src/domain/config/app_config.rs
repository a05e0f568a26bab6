//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::audio::{default_preferred_types, parse_type_list, MimeType};
use crate::domain::recording::Duration;

/// Default capture/encoding sample rate (speech-optimized)
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Accepted sample rate range in Hz
pub const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<u32> = 8_000..=48_000;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Comma-separated encoding priority list
    pub preferred_types: Option<String>,
    pub sample_rate: Option<u32>,
    pub max_duration: Option<String>,
    pub input_device: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            preferred_types: Some(
                default_preferred_types()
                    .iter()
                    .map(MimeType::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            sample_rate: Some(DEFAULT_SAMPLE_RATE),
            max_duration: Some(Duration::default_max_duration().to_string()),
            input_device: None,
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
            preferred_types: other.preferred_types.or(self.preferred_types),
            sample_rate: other.sample_rate.or(self.sample_rate),
            max_duration: other.max_duration.or(self.max_duration),
            input_device: other.input_device.or(self.input_device),
        }
    }

    /// Encoding priority list, or the built-in list if unset/invalid/empty
    pub fn preferred_types_or_default(&self) -> Vec<MimeType> {
        self.preferred_types
            .as_deref()
            .and_then(|s| parse_type_list(s).ok())
            .filter(|list| !list.is_empty())
            .unwrap_or_else(default_preferred_types)
    }

    /// Sample rate, or the default if unset/out of range
    pub fn sample_rate_or_default(&self) -> u32 {
        self.sample_rate
            .filter(|rate| SAMPLE_RATE_RANGE.contains(rate))
            .unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Max recording duration, or the default if unset/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_duration)
    }

    /// Input device name; `None` means the host default
    pub fn input_device(&self) -> Option<&str> {
        self.input_device.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.sample_rate, Some(16_000));
        assert_eq!(config.max_duration, Some("10m".to_string()));
        assert!(config.input_device.is_none());
        let types = config.preferred_types_or_default();
        assert_eq!(types.first().map(MimeType::as_str), Some("audio/webm;codecs=opus"));
        assert_eq!(types.last().map(MimeType::as_str), Some("audio/wav"));
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            sample_rate: Some(16_000),
            max_duration: Some("1m".into()),
            ..Default::default()
        };
        let other = AppConfig {
            sample_rate: Some(44_100),
            input_device: Some("USB Mic".into()),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.sample_rate, Some(44_100));
        assert_eq!(merged.max_duration, Some("1m".into()));
        assert_eq!(merged.input_device(), Some("USB Mic"));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = AppConfig {
            preferred_types: Some("not a type".into()),
            sample_rate: Some(1),
            max_duration: Some("forever".into()),
            input_device: Some("   ".into()),
        };
        assert_eq!(config.preferred_types_or_default(), default_preferred_types());
        assert_eq!(config.sample_rate_or_default(), DEFAULT_SAMPLE_RATE);
        assert_eq!(config.max_duration_or_default(), Duration::default_max_duration());
        assert!(config.input_device().is_none());
    }

    #[test]
    fn custom_preferred_types_are_parsed() {
        let config = AppConfig {
            preferred_types: Some("audio/wav, audio/flac".into()),
            ..Default::default()
        };
        let types: Vec<_> = config
            .preferred_types_or_default()
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();
        assert_eq!(types, vec!["audio/wav", "audio/flac"]);
    }
}
