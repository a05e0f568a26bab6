//! MIME type value object and encoder negotiation

use std::fmt;
use std::str::FromStr;

use crate::domain::error::MimeTypeParseError;

/// Encoding priority used when nothing else is configured.
///
/// Compressed browser-style containers first, then the lossless and raw
/// formats a native encoder can always produce.
pub const DEFAULT_PREFERRED_TYPES: &[&str] = &[
    "audio/webm;codecs=opus",
    "audio/webm",
    "audio/ogg;codecs=opus",
    "audio/ogg",
    "audio/flac",
    "audio/wav",
];

/// A MIME-like media type such as `audio/ogg;codecs=opus`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MimeType(String);

impl MimeType {
    /// Build from a literal known to be lowercase and well-formed
    pub fn from_static(raw: &'static str) -> Self {
        Self(raw.to_string())
    }

    /// The full type string, parameters included
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Type and subtype without parameters (`audio/ogg`)
    pub fn essence(&self) -> &str {
        self.0.split(';').next().unwrap_or_default().trim()
    }

    /// File extension hint for this type
    pub fn extension(&self) -> &'static str {
        match self.essence() {
            "audio/webm" => "webm",
            "audio/ogg" => "ogg",
            "audio/flac" | "audio/x-flac" => "flac",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/mp4" => "m4a",
            _ => "bin",
        }
    }
}

impl FromStr for MimeType {
    type Err = MimeTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(' ', "");
        let essence = normalized.split(';').next().unwrap_or_default();
        let valid = match essence.split_once('/') {
            Some((kind, sub)) => !kind.is_empty() && !sub.is_empty() && !sub.contains('/'),
            None => false,
        };
        if !valid {
            return Err(MimeTypeParseError {
                input: s.to_string(),
            });
        }
        Ok(Self(normalized))
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a comma-separated list of MIME types, skipping blanks
pub fn parse_type_list(list: &str) -> Result<Vec<MimeType>, MimeTypeParseError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// The built-in priority list as parsed values
pub fn default_preferred_types() -> Vec<MimeType> {
    DEFAULT_PREFERRED_TYPES
        .iter()
        .map(|t| MimeType::from_static(t))
        .collect()
}

/// Pick the first preferred type the platform supports.
///
/// Returns `None` when nothing in `preferred` is supported; the caller then
/// falls back to its own default encoding.
pub fn negotiate<'a>(
    preferred: &'a [MimeType],
    is_supported: impl Fn(&MimeType) -> bool,
) -> Option<&'a MimeType> {
    preferred.iter().find(|t| is_supported(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mime(s: &str) -> MimeType {
        s.parse().unwrap()
    }

    #[test]
    fn essence_strips_parameters() {
        assert_eq!(mime("audio/ogg;codecs=opus").essence(), "audio/ogg");
        assert_eq!(mime("audio/wav").essence(), "audio/wav");
    }

    #[test]
    fn parse_normalizes_case_and_spaces() {
        assert_eq!(mime(" Audio/WebM; codecs=opus ").as_str(), "audio/webm;codecs=opus");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("audio".parse::<MimeType>().is_err());
        assert!("/ogg".parse::<MimeType>().is_err());
        assert!("audio/".parse::<MimeType>().is_err());
        assert!("a/b/c".parse::<MimeType>().is_err());
    }

    #[test]
    fn extension_hints() {
        assert_eq!(mime("audio/flac").extension(), "flac");
        assert_eq!(mime("audio/webm;codecs=opus").extension(), "webm");
        assert_eq!(mime("application/x-unknown").extension(), "bin");
    }

    #[test]
    fn negotiate_picks_first_supported_in_priority_order() {
        let preferred = default_preferred_types();
        let picked = negotiate(&preferred, |t| {
            matches!(t.essence(), "audio/wav" | "audio/flac")
        });
        assert_eq!(picked.map(MimeType::as_str), Some("audio/flac"));
    }

    #[test]
    fn negotiate_returns_none_when_nothing_matches() {
        let preferred = vec![mime("audio/webm"), mime("audio/ogg")];
        assert!(negotiate(&preferred, |_| false).is_none());
    }

    #[test]
    fn parse_type_list_skips_blanks() {
        let list = parse_type_list("audio/wav, ,audio/flac,").unwrap();
        assert_eq!(list, vec![mime("audio/wav"), mime("audio/flac")]);
        assert!(parse_type_list("audio/wav,nonsense").is_err());
    }
}
