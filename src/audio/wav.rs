//! WAV file writer for generated artifacts.
//!
//! Writes audio samples to WAV format using the hound crate.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::{Result, ServiceError};

/// Number of audio channels (stereo).
pub const CHANNELS: u16 = 2;

/// Writes audio samples to a WAV file.
///
/// Mono samples are duplicated into both channels. Failures map to
/// storage errors since the samples themselves are already in hand.
pub fn write_wav(samples: &[f32], path: &Path, sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: CHANNELS,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| {
        ServiceError::storage(format!("failed to create WAV file {}: {}", path.display(), e))
    })?;

    for sample in samples {
        // Write same sample to both left and right channels
        writer
            .write_sample(*sample)
            .map_err(|e| ServiceError::storage(format!("failed to write sample: {}", e)))?;
        writer
            .write_sample(*sample)
            .map_err(|e| ServiceError::storage(format!("failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| ServiceError::storage(format!("failed to finalize WAV file: {}", e)))?;

    Ok(())
}

/// Calculates the duration of audio in seconds from sample count.
pub fn samples_to_duration(sample_count: usize, sample_rate: u32) -> f32 {
    sample_count as f32 / sample_rate as f32
}
