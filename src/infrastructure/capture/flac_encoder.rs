//! FLAC encoder
//!
//! Lossless and roughly 40% of the equivalent WAV size, which keeps
//! in-memory recordings small.
//!
//! Settings:
//! - Mono channel
//! - 16-bit samples
//! - Sample rate chosen by the caller

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;

use super::codec::EncodingError;

/// Bits per sample (16-bit audio)
const BITS_PER_SAMPLE: usize = 16;

/// Number of channels (mono)
const CHANNELS: usize = 1;

/// Encode mono i16 PCM at `sample_rate` into a complete FLAC stream
pub fn encode_to_flac(pcm_samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EncodingError> {
    // flacenc works on i32 samples
    let samples_i32: Vec<i32> = pcm_samples.iter().map(|&s| s as i32).collect();

    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodingError::Config(format!("{:?}", e)))?;

    let source = MemSource::from_samples(
        &samples_i32,
        CHANNELS,
        BITS_PER_SAMPLE,
        sample_rate as usize,
    );

    let flac_stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodingError::Encode(format!("{:?}", e)))?;

    let mut sink = ByteSink::new();
    flac_stream
        .write(&mut sink)
        .map_err(|e| EncodingError::Write(e.to_string()))?;

    Ok(sink.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_silence_with_flac_magic() {
        let silence = vec![0i16; 16_000];
        let flac_data = encode_to_flac(&silence, 16_000).unwrap();
        assert!(flac_data.len() > 50);
        assert_eq!(&flac_data[0..4], b"fLaC");
    }

    #[test]
    fn tone_compresses_below_raw_size() {
        let rate = 22_050u32;
        let samples: Vec<i16> = (0..rate as usize)
            .map(|i| {
                let t = i as f32 / rate as f32;
                (f32::sin(2.0 * std::f32::consts::PI * 330.0 * t) * 12_000.0) as i16
            })
            .collect();

        let flac_data = encode_to_flac(&samples, rate).unwrap();
        assert!(flac_data.len() < samples.len() * 2);
    }
}
