//! External generator seam.
//!
//! Model inference lives behind [`SoundGenerator`]; the rest of the
//! service only sees samples and a sample rate.

use crate::error::Result;

/// Audio produced by a generator backend.
#[derive(Debug, Clone)]
pub struct GeneratedAudio {
    /// Mono audio samples as f32 values.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

/// A sound generation backend.
///
/// Implementations block for the full duration of inference, which may be
/// minutes; callers run them off the async executor and hold no locks
/// across the call. A failure is surfaced, never retried: inference is
/// expensive and not idempotent.
pub trait SoundGenerator: Send + Sync {
    /// Generates audio for `prompt` with the given step count and
    /// duration in seconds.
    fn generate(&self, prompt: &str, steps: u32, duration_sec: u32) -> Result<GeneratedAudio>;
}
