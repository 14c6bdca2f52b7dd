//! Generation pipeline.
//!
//! Orchestrates a validated request through directory allocation, unique
//! filename synthesis, the external generator call, the artifact write,
//! and metadata persistence.

use std::path::Path;
use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::audio::write_wav;
use crate::error::{Result, ServiceError};
use crate::storage::{DirectoryAllocator, IdentityKey, MetadataStore};
use crate::types::{ArtifactDescriptor, GenerateRequest};

use super::generator::SoundGenerator;

/// Length of the random suffix appended to the requested stem.
const SUFFIX_LEN: usize = 8;

/// Attempts before giving up on finding a free filename.
const MAX_SUFFIX_ATTEMPTS: u32 = 16;

/// Runs generation requests end to end for authenticated callers.
pub struct GenerationPipeline {
    allocator: Arc<DirectoryAllocator>,
    metadata: Arc<MetadataStore>,
    generator: Arc<dyn SoundGenerator>,
}

impl GenerationPipeline {
    /// Creates a pipeline over the given storage and generator backend.
    pub fn new(
        allocator: Arc<DirectoryAllocator>,
        metadata: Arc<MetadataStore>,
        generator: Arc<dyn SoundGenerator>,
    ) -> Self {
        Self {
            allocator,
            metadata,
            generator,
        }
    }

    /// Runs one generation request for the identified caller.
    ///
    /// Fails without side effects on validation errors. A generator
    /// failure leaves no artifact file and no metadata entry; a metadata
    /// failure after a successful write leaves the artifact on disk,
    /// which the lenient read path tolerates.
    pub fn run(&self, key: &IdentityKey, request: &GenerateRequest) -> Result<ArtifactDescriptor> {
        let validated = request.validate()?;
        let dir = self.allocator.ensure(key)?;
        let sounds_dir = dir.sounds_dir();
        let filename = unique_filename(&sounds_dir, &validated.stem)?;

        // The generator call is the single long-running step. No
        // directory or metadata lock is held across it, and it is never
        // retried.
        let audio = self
            .generator
            .generate(&validated.prompt, validated.steps, validated.duration_sec)?;

        let output_path = sounds_dir.join(&filename);
        if let Err(e) = write_wav(&audio.samples, &output_path, audio.sample_rate) {
            let _ = std::fs::remove_file(&output_path);
            return Err(e);
        }

        self.metadata.upsert(&dir, &filename, &validated.prompt)?;

        tracing::info!(key = %key, filename = %filename, "artifact generated");
        Ok(ArtifactDescriptor {
            filename,
            prompt: validated.prompt,
        })
    }
}

/// Synthesizes a filename that does not collide with an existing artifact,
/// even when the same stem is reused.
fn unique_filename(sounds_dir: &Path, stem: &str) -> Result<String> {
    for _ in 0..MAX_SUFFIX_ATTEMPTS {
        let candidate = format!("{}_{}.wav", stem, random_suffix());
        if !sounds_dir.join(&candidate).exists() {
            return Ok(candidate);
        }
    }
    Err(ServiceError::storage(format!(
        "could not find a free filename for stem {:?}",
        stem
    )))
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}
