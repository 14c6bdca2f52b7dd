//! Generation request type and validation.
//!
//! A request is validated in a fixed order, short-circuiting on the first
//! failure, before any directory or generator work is triggered.

use serde::Deserialize;

use crate::error::{Result, ServiceError};

/// Step counts the generator accepts.
pub const ALLOWED_STEP_COUNTS: [u32; 6] = [200, 250, 300, 350, 400, 500];

/// Minimum requested duration in seconds.
pub const MIN_DURATION_SEC: u32 = 1;

/// Maximum requested duration in seconds.
pub const MAX_DURATION_SEC: u32 = 30;

/// An inbound generation request, as received on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    /// Text description of the desired sound.
    pub prompt: String,

    /// Requested filename stem; a random suffix is appended on success.
    pub filename: String,

    /// Number of inference steps.
    pub num_of_steps: u32,

    /// Duration of audio to generate in seconds.
    pub duration: u32,
}

/// A request that passed validation.
///
/// The stem is trimmed and guaranteed to be a bare name, safe to embed in
/// an on-disk filename.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub prompt: String,
    pub stem: String,
    pub steps: u32,
    pub duration_sec: u32,
}

impl GenerateRequest {
    /// Validates the request, producing a [`ValidatedRequest`].
    ///
    /// Rules are checked in order and the first failure wins:
    /// prompt presence, filename presence and shape, step count, duration.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        if self.prompt.is_empty() {
            return Err(ServiceError::empty_prompt());
        }

        let stem = self.filename.trim();
        if stem.is_empty() {
            return Err(ServiceError::empty_filename());
        }
        if !is_bare_name(stem) {
            return Err(ServiceError::unsafe_filename(stem));
        }

        if !ALLOWED_STEP_COUNTS.contains(&self.num_of_steps) {
            return Err(ServiceError::invalid_steps(self.num_of_steps));
        }

        if !(MIN_DURATION_SEC..=MAX_DURATION_SEC).contains(&self.duration) {
            return Err(ServiceError::invalid_duration(self.duration));
        }

        Ok(ValidatedRequest {
            prompt: self.prompt.clone(),
            stem: stem.to_string(),
            steps: self.num_of_steps,
            duration_sec: self.duration,
        })
    }
}

/// Returns true if `name` is a single bare path component.
///
/// Rejects separators, parent references, and leading dots so the name can
/// never address anything outside its owning directory.
pub fn is_bare_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') {
        return false;
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return false;
    }
    // Null bytes are invalid in paths on every supported platform.
    !name.contains('\0')
}
