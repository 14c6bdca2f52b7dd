//! Wire types for the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ArtifactEntry;

/// Success payload for `POST /generate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub filename: String,
    pub prompt: String,
}

/// One row of `GET /my-sounds`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SoundListing {
    pub filename: String,
    pub prompt: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ArtifactEntry> for SoundListing {
    fn from(entry: ArtifactEntry) -> Self {
        Self {
            filename: entry.filename,
            prompt: entry.prompt,
            created_at: entry.created_at,
        }
    }
}

/// Error payload, `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
