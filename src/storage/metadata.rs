//! Per-directory artifact metadata.
//!
//! Each user directory carries one `metadata.json` mapping artifact
//! filename to its entry. Updates are read-merge-write under a
//! per-directory lock, and the file is replaced atomically (temp file +
//! rename) so a crash mid-write never leaves a truncated store behind.
//! Writes to different users' stores never block each other.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{Result, ServiceError};
use crate::types::ArtifactEntry;

use super::allocator::UserDirectory;

/// Serializes metadata writes per user directory.
#[derive(Default)]
pub struct MetadataStore {
    locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl MetadataStore {
    /// Creates a new store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the entry for `filename`, stamped with the
    /// current time, and returns it.
    pub fn upsert(&self, dir: &UserDirectory, filename: &str, prompt: &str) -> Result<ArtifactEntry> {
        let lock = self.lock_for(dir);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let path = dir.metadata_path();
        let mut entries = read_entries(&path);
        let entry = ArtifactEntry::new(filename, prompt);
        entries.insert(filename.to_string(), entry.clone());
        write_entries(&path, &entries)?;
        Ok(entry)
    }

    /// Reads the full mapping for a directory.
    ///
    /// A missing or unreadable metadata file yields an empty mapping,
    /// never an error.
    pub fn read_all(&self, dir: &UserDirectory) -> BTreeMap<String, ArtifactEntry> {
        read_entries(&dir.metadata_path())
    }

    fn lock_for(&self, dir: &UserDirectory) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(dir.sequence_id())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, ArtifactEntry> {
    match fs::read_to_string(path) {
        Ok(body) => serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "unreadable metadata file, treating as empty");
            BTreeMap::new()
        }),
        Err(_) => BTreeMap::new(),
    }
}

fn write_entries(path: &Path, entries: &BTreeMap<String, ArtifactEntry>) -> Result<()> {
    let body = serde_json::to_string_pretty(entries).map_err(|e| {
        ServiceError::with_source(
            crate::error::ErrorCode::StorageUnavailable,
            "failed to encode metadata",
            e,
        )
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).map_err(|e| {
        ServiceError::storage_io(format!("failed to write {}", tmp.display()), e)
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        ServiceError::storage_io(format!("failed to replace {}", path.display()), e)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DirectoryAllocator, IdentityKey};
    use std::thread;
    use tempfile::tempdir;

    fn user_dir(root: &Path, email: &str) -> Arc<UserDirectory> {
        DirectoryAllocator::open(root)
            .unwrap()
            .ensure(&IdentityKey::derive(email))
            .unwrap()
    }

    #[test]
    fn upsert_then_read_all_round_trips() {
        let root = tempdir().unwrap();
        let dir = user_dir(root.path(), "alice@example.com");
        let store = MetadataStore::new();

        store
            .upsert(&dir, "rain_ab12cd34.wav", "rain on a tin roof")
            .unwrap();

        let entries = store.read_all(&dir);
        let entry = entries.get("rain_ab12cd34.wav").unwrap();
        assert_eq!(entry.prompt, "rain on a tin roof");
        assert!(entry.created_at.is_some());
    }

    #[test]
    fn read_all_with_no_file_is_empty() {
        let root = tempdir().unwrap();
        let dir = user_dir(root.path(), "alice@example.com");
        let store = MetadataStore::new();

        assert!(store.read_all(&dir).is_empty());
    }

    #[test]
    fn read_all_with_corrupt_file_is_empty() {
        let root = tempdir().unwrap();
        let dir = user_dir(root.path(), "alice@example.com");
        fs::write(dir.metadata_path(), "{ not json").unwrap();

        let store = MetadataStore::new();
        assert!(store.read_all(&dir).is_empty());
    }

    #[test]
    fn upsert_merges_with_existing_entries() {
        let root = tempdir().unwrap();
        let dir = user_dir(root.path(), "alice@example.com");
        let store = MetadataStore::new();

        store.upsert(&dir, "first.wav", "first prompt").unwrap();
        store.upsert(&dir, "second.wav", "second prompt").unwrap();

        let entries = store.read_all(&dir);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get("first.wav").unwrap().prompt, "first prompt");
    }

    #[test]
    fn upsert_overwrites_same_filename() {
        let root = tempdir().unwrap();
        let dir = user_dir(root.path(), "alice@example.com");
        let store = MetadataStore::new();

        store.upsert(&dir, "clip.wav", "old").unwrap();
        store.upsert(&dir, "clip.wav", "new").unwrap();

        let entries = store.read_all(&dir);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get("clip.wav").unwrap().prompt, "new");
    }

    #[test]
    fn no_temp_debris_after_write() {
        let root = tempdir().unwrap();
        let dir = user_dir(root.path(), "alice@example.com");
        let store = MetadataStore::new();

        store.upsert(&dir, "clip.wav", "prompt").unwrap();
        assert!(!dir.metadata_path().with_extension("json.tmp").exists());
    }

    #[test]
    fn concurrent_upserts_to_same_directory_all_land() {
        let root = tempdir().unwrap();
        let dir = user_dir(root.path(), "alice@example.com");
        let store = Arc::new(MetadataStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let dir = dir.clone();
                thread::spawn(move || {
                    store
                        .upsert(&dir, &format!("clip_{}.wav", i), "prompt")
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.read_all(&dir).len(), 8);
    }
}
