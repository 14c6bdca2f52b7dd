//! Owner-only artifact access.
//!
//! Resolves artifacts strictly within the caller's own directory. The
//! caller-supplied filename is rejected before any filesystem work unless
//! it is a single bare path component, so no request can address another
//! user's directory or anything outside the content root.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Result, ServiceError};
use crate::types::{is_bare_name, ArtifactEntry};

use super::allocator::DirectoryAllocator;
use super::identity::IdentityKey;
use super::metadata::MetadataStore;

/// Resolves artifact access for authenticated callers.
pub struct AccessGate {
    allocator: Arc<DirectoryAllocator>,
    metadata: Arc<MetadataStore>,
}

impl AccessGate {
    /// Creates a gate over the given allocator and metadata store.
    pub fn new(allocator: Arc<DirectoryAllocator>, metadata: Arc<MetadataStore>) -> Self {
        Self {
            allocator,
            metadata,
        }
    }

    /// Resolves `filename` to its on-disk path if it exists inside the
    /// caller's own directory.
    ///
    /// Lookup only; never creates a directory. Traversal attempts and
    /// other users' artifacts both come back as not-found, with no hint
    /// of which it was.
    pub fn resolve_owned(&self, key: &IdentityKey, filename: &str) -> Result<PathBuf> {
        if !is_bare_name(filename) {
            tracing::warn!(key = %key, filename, "rejected non-bare artifact name");
            return Err(ServiceError::not_found(format!("artifact {:?}", filename)));
        }

        let dir = self
            .allocator
            .lookup(key)?
            .ok_or_else(|| ServiceError::not_found(format!("artifact {:?}", filename)))?;

        let path = dir.sounds_dir().join(filename);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ServiceError::not_found(format!("artifact {:?}", filename)))
        }
    }

    /// Lists the caller's artifacts, newest first.
    ///
    /// The `sounds/` folder is enumerated and joined against the metadata
    /// store; artifact files with no recorded entry get a placeholder that
    /// sorts after every dated entry. A caller with no directory gets an
    /// empty listing.
    pub fn list_owned(&self, key: &IdentityKey) -> Result<Vec<ArtifactEntry>> {
        let Some(dir) = self.allocator.lookup(key)? else {
            return Ok(Vec::new());
        };

        let entries = self.metadata.read_all(&dir);
        let read = match fs::read_dir(dir.sounds_dir()) {
            Ok(read) => read,
            // A sounds folder removed out-of-band degrades to an empty
            // listing, matching the lenient metadata read.
            Err(_) => return Ok(Vec::new()),
        };

        let mut listing = Vec::new();
        for file in read.flatten() {
            let name = file.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".wav") {
                continue;
            }
            match entries.get(&name) {
                Some(entry) => listing.push(entry.clone()),
                None => listing.push(ArtifactEntry::placeholder(name)),
            }
        }

        // Newest first; entries without a timestamp sort last.
        listing.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Ok(listing)
    }
}
