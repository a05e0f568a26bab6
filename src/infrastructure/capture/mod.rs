//! Microphone capture adapter
//!
//! Opens the input device with cpal, buffers mono PCM while an encoder is
//! running, and encodes to FLAC or WAV when the encoder stops.

mod codec;
mod cpal_device;
mod flac_encoder;
mod resample;
mod wav_encoder;

pub use codec::{Codec, EncodingError};
pub use cpal_device::{CaptureFormat, CpalCaptureDevice, CpalEncoder, CpalStream};
