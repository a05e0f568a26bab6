//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 30s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a MIME type string is malformed
#[derive(Debug, Clone, Error)]
#[error("Invalid MIME type: \"{input}\". Expected <type>/<subtype>[;params] (e.g., audio/ogg;codecs=opus)")]
pub struct MimeTypeParseError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

/// Failures surfaced by the recorder.
///
/// None of these terminate the program. Capture failures reset the recorder
/// to idle, playback failures leave a finished recording in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    #[error("This host doesn't support recording (no capture device available)")]
    UnsupportedCapability,

    #[error("mic permission blocked or error: {0}")]
    PermissionDenied(String),

    #[error("recording error: {0}")]
    CaptureError(String),

    #[error("playback blocked: {0}")]
    PlaybackBlocked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_message_carries_detail() {
        let err = RecorderError::PermissionDenied("device busy".into());
        assert_eq!(err.to_string(), "mic permission blocked or error: device busy");
    }

    #[test]
    fn config_validation_message() {
        let err = ConfigError::ValidationError {
            key: "sample_rate".into(),
            message: "out of range".into(),
        };
        assert!(err.to_string().contains("sample_rate"));
        assert!(err.to_string().contains("out of range"));
    }
}
