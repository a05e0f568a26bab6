//! WAV encoder (mono, 16-bit PCM)

use std::io::Cursor;

use hound::{WavSpec, WavWriter};

use super::codec::EncodingError;

/// Encode mono i16 PCM at `sample_rate` into a complete WAV file
pub fn encode_to_wav(pcm_samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EncodingError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + pcm_samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| EncodingError::Config(e.to_string()))?;
        for &sample in pcm_samples {
            writer
                .write_sample(sample)
                .map_err(|e| EncodingError::Write(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| EncodingError::Write(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
