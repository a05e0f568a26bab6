//! Container formats the capture adapter can produce

use thiserror::Error;

use super::flac_encoder::encode_to_flac;
use super::wav_encoder::encode_to_wav;
use crate::domain::audio::MimeType;

/// Encoding pipeline errors
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("encoder config: {0}")]
    Config(String),

    #[error("encode: {0}")]
    Encode(String),

    #[error("write: {0}")]
    Write(String),

    #[error("resample: {0}")]
    Resample(String),
}

/// Supported output codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    #[default]
    Flac,
    Wav,
}

impl Codec {
    /// Codec for a MIME type, matched on its essence (parameters ignored)
    pub fn for_mime(mime: &MimeType) -> Option<Self> {
        match mime.essence() {
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> MimeType {
        let raw = match self {
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
        };
        MimeType::from_static(raw)
    }

    pub fn encode(&self, samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EncodingError> {
        match self {
            Self::Flac => encode_to_flac(samples, sample_rate),
            Self::Wav => encode_to_wav(samples, sample_rate),
        }
    }
}
