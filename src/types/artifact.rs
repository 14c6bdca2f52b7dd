//! Artifact metadata types.
//!
//! An artifact is a generated audio file inside a user directory. Each one
//! has a metadata entry keyed by filename; entries are created at generation
//! time and never mutated afterward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata recorded for one generated artifact.
///
/// `created_at` is `None` for placeholder entries synthesized at read time
/// when an artifact file exists on disk without a recorded entry; metadata
/// and artifact writes are not transactional with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Artifact filename, unique within the owning directory.
    pub filename: String,

    /// Original text prompt used for generation. Empty for placeholders.
    #[serde(default)]
    pub prompt: String,

    /// Wall-clock creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ArtifactEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(filename: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            prompt: prompt.into(),
            created_at: Some(Utc::now()),
        }
    }

    /// Creates a placeholder entry for a file with no recorded metadata.
    pub fn placeholder(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            prompt: String::new(),
            created_at: None,
        }
    }
}

/// Result descriptor returned for a successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    /// Final on-disk filename, including the uniquifying suffix.
    pub filename: String,

    /// Prompt the artifact was generated from.
    pub prompt: String,
}
