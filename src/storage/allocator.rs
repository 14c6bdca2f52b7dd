//! Per-user directory allocation.
//!
//! Every identity key owns exactly one directory under the content root,
//! named `{key}_{YYYYMMDD}_{seq}` with a `sounds/` subfolder for artifacts
//! and a `metadata.json` beside it. Directories are created lazily on a
//! user's first authenticated action and never deleted by the service.
//!
//! The filesystem is the source of truth; the in-memory index is a
//! rebuildable cache over the directory listing.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;

use crate::error::{Result, ServiceError};

use super::identity::IdentityKey;

/// Subfolder holding a user's generated artifacts.
pub const ARTIFACT_SUBDIR: &str = "sounds";

/// Per-directory metadata file name.
pub const METADATA_FILE: &str = "metadata.json";

/// Handle to one user's on-disk directory.
#[derive(Debug)]
pub struct UserDirectory {
    key: IdentityKey,
    sequence_id: u64,
    path: PathBuf,
}

impl UserDirectory {
    /// Returns the identity key owning this directory.
    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    /// Returns the directory's sequence id, unique across all users.
    pub fn sequence_id(&self) -> u64 {
        self.sequence_id
    }

    /// Returns the directory's path under the content root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the artifact subfolder path.
    pub fn sounds_dir(&self) -> PathBuf {
        self.path.join(ARTIFACT_SUBDIR)
    }

    /// Returns the metadata file path.
    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_FILE)
    }
}

/// Allocates and resolves per-user directories under a content root.
pub struct DirectoryAllocator {
    root: PathBuf,
    /// Identity key -> handle cache, rebuilt from the listing on startup.
    index: RwLock<HashMap<IdentityKey, Arc<UserDirectory>>>,
    /// Next sequence id. Locking this serializes the scan-then-create
    /// sequence; ids are handed out strictly increasing and never reused
    /// within a process lifetime.
    next_sequence_id: Mutex<u64>,
}

impl DirectoryAllocator {
    /// Opens an allocator over `root`, creating the root if absent and
    /// rebuilding the index from the existing directory listing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            ServiceError::storage_io(
                format!("failed to create content root {}", root.display()),
                e,
            )
        })?;

        let mut index = HashMap::new();
        let mut max_seq = 0u64;
        for name in list_dir_names(&root)? {
            if let Some((key, seq)) = parse_dir_name(&name) {
                max_seq = max_seq.max(seq);
                let dir = Arc::new(UserDirectory {
                    key: key.clone(),
                    sequence_id: seq,
                    path: root.join(&name),
                });
                index.insert(key, dir);
            }
        }

        Ok(Self {
            root,
            index: RwLock::new(index),
            next_sequence_id: Mutex::new(max_seq + 1),
        })
    }

    /// Returns the content root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the directory for `key`, creating it on first use.
    ///
    /// Idempotent: repeated calls return the same handle. Safe under
    /// concurrent first-time calls for the same or different keys.
    pub fn ensure(&self, key: &IdentityKey) -> Result<Arc<UserDirectory>> {
        if let Some(dir) = self.cached(key) {
            return Ok(dir);
        }

        let mut next_seq = lock_seq(&self.next_sequence_id);

        // Re-check under the lock: another request may have created the
        // directory while this one waited.
        if let Some(dir) = self.cached(key) {
            return Ok(dir);
        }
        if let Some(dir) = self.scan_for(key)? {
            self.remember(dir.clone());
            return Ok(dir);
        }

        let seq = *next_seq;
        let name = format!("{}_{}_{}", key.as_str(), Utc::now().format("%Y%m%d"), seq);
        let path = self.root.join(&name);

        if let Err(e) = fs::create_dir_all(path.join(ARTIFACT_SUBDIR)) {
            // No handle may reference a half-created directory.
            let _ = fs::remove_dir_all(&path);
            return Err(ServiceError::storage_io(
                format!("failed to create user directory {}", path.display()),
                e,
            ));
        }

        *next_seq = seq + 1;
        let dir = Arc::new(UserDirectory {
            key: key.clone(),
            sequence_id: seq,
            path,
        });
        self.remember(dir.clone());
        tracing::info!(key = %key, seq, "created user directory");
        Ok(dir)
    }

    /// Resolves the directory for `key` without creating one.
    pub fn lookup(&self, key: &IdentityKey) -> Result<Option<Arc<UserDirectory>>> {
        if let Some(dir) = self.cached(key) {
            return Ok(Some(dir));
        }
        // The index is a cache; consult the listing before declaring
        // the directory absent.
        if let Some(dir) = self.scan_for(key)? {
            self.remember(dir.clone());
            return Ok(Some(dir));
        }
        Ok(None)
    }

    fn cached(&self, key: &IdentityKey) -> Option<Arc<UserDirectory>> {
        self.index
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn remember(&self, dir: Arc<UserDirectory>) {
        self.index
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(dir.key.clone(), dir);
    }

    /// Scans the content root for a directory whose name is prefixed by
    /// `key`.
    fn scan_for(&self, key: &IdentityKey) -> Result<Option<Arc<UserDirectory>>> {
        let prefix = format!("{}_", key.as_str());
        for name in list_dir_names(&self.root)? {
            if !name.starts_with(&prefix) {
                continue;
            }
            if let Some((parsed_key, seq)) = parse_dir_name(&name) {
                if parsed_key == *key {
                    return Ok(Some(Arc::new(UserDirectory {
                        key: parsed_key,
                        sequence_id: seq,
                        path: self.root.join(&name),
                    })));
                }
            }
        }
        Ok(None)
    }
}

fn lock_seq(mutex: &Mutex<u64>) -> std::sync::MutexGuard<'_, u64> {
    // A poisoned lock means another thread panicked between fs calls; the
    // counter itself is still valid.
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn list_dir_names(root: &Path) -> Result<Vec<String>> {
    let read = fs::read_dir(root).map_err(|e| {
        ServiceError::storage_io(format!("failed to list content root {}", root.display()), e)
    })?;
    let mut names = Vec::new();
    for entry in read.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Parses `{key}_{YYYYMMDD}_{seq}` into (key, seq).
///
/// Returns None for directory names that do not follow the layout, which
/// are ignored rather than treated as errors.
fn parse_dir_name(name: &str) -> Option<(IdentityKey, u64)> {
    let mut parts = name.rsplitn(3, '_');
    let seq: u64 = parts.next()?.parse().ok()?;
    let date = parts.next()?;
    let key = parts.next()?;
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) || key.is_empty() {
        return None;
    }
    Some((IdentityKey::from_raw(key), seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::tempdir;

    fn key(email: &str) -> IdentityKey {
        IdentityKey::derive(email)
    }

    #[test]
    fn first_ensure_creates_directory_with_seq_one() {
        let root = tempdir().unwrap();
        let allocator = DirectoryAllocator::open(root.path()).unwrap();

        let dir = allocator.ensure(&key("alice@example.com")).unwrap();
        assert_eq!(dir.sequence_id(), 1);
        assert!(dir.sounds_dir().is_dir());
    }

    #[test]
    fn ensure_is_idempotent() {
        let root = tempdir().unwrap();
        let allocator = DirectoryAllocator::open(root.path()).unwrap();
        let k = key("alice@example.com");

        let first = allocator.ensure(&k).unwrap();
        let second = allocator.ensure(&k).unwrap();
        assert_eq!(first.path(), second.path());
        assert_eq!(first.sequence_id(), second.sequence_id());

        // Exactly one directory exists for the key.
        let count = std::fs::read_dir(root.path()).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn distinct_identities_get_distinct_sequence_ids() {
        let root = tempdir().unwrap();
        let allocator = DirectoryAllocator::open(root.path()).unwrap();

        let a = allocator.ensure(&key("a@example.com")).unwrap();
        let b = allocator.ensure(&key("b@example.com")).unwrap();
        assert_ne!(a.sequence_id(), b.sequence_id());
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn concurrent_first_time_ensures_do_not_collide() {
        let root = tempdir().unwrap();
        let allocator = Arc::new(DirectoryAllocator::open(root.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let allocator = allocator.clone();
                thread::spawn(move || {
                    allocator
                        .ensure(&key(&format!("user{}@example.com", i)))
                        .unwrap()
                        .sequence_id()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8, "sequence ids must be unique");
    }

    #[test]
    fn concurrent_ensures_for_same_identity_create_one_directory() {
        let root = tempdir().unwrap();
        let allocator = Arc::new(DirectoryAllocator::open(root.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let allocator = allocator.clone();
                thread::spawn(move || allocator.ensure(&key("same@example.com")).unwrap().sequence_id())
            })
            .collect();

        let ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn lookup_does_not_create() {
        let root = tempdir().unwrap();
        let allocator = DirectoryAllocator::open(root.path()).unwrap();

        assert!(allocator.lookup(&key("ghost@example.com")).unwrap().is_none());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn index_rebuilds_from_existing_layout() {
        let root = tempdir().unwrap();
        {
            let allocator = DirectoryAllocator::open(root.path()).unwrap();
            allocator.ensure(&key("alice@example.com")).unwrap();
            allocator.ensure(&key("bob@example.com")).unwrap();
        }

        // A fresh allocator over the same root picks up where the
        // previous one left off.
        let allocator = DirectoryAllocator::open(root.path()).unwrap();
        let alice = allocator.lookup(&key("alice@example.com")).unwrap().unwrap();
        assert_eq!(alice.sequence_id(), 1);

        let carol = allocator.ensure(&key("carol@example.com")).unwrap();
        assert_eq!(carol.sequence_id(), 3);
    }

    #[test]
    fn sequence_id_not_reused_after_out_of_band_removal() {
        let root = tempdir().unwrap();
        let allocator = DirectoryAllocator::open(root.path()).unwrap();

        let bob = allocator.ensure(&key("bob@example.com")).unwrap();
        std::fs::remove_dir_all(bob.path()).unwrap();

        // The removed directory held the max id; the next allocation must
        // still move past it.
        let carol = allocator.ensure(&key("carol@example.com")).unwrap();
        assert!(carol.sequence_id() > bob.sequence_id());
    }

    #[test]
    fn foreign_directories_are_ignored() {
        let root = tempdir().unwrap();
        std::fs::create_dir(root.path().join("lost+found")).unwrap();
        std::fs::create_dir(root.path().join("not_a_user_dir")).unwrap();

        let allocator = DirectoryAllocator::open(root.path()).unwrap();
        let dir = allocator.ensure(&key("alice@example.com")).unwrap();
        assert_eq!(dir.sequence_id(), 1);
    }

    #[test]
    fn parse_dir_name_shapes() {
        assert!(parse_dir_name("alice_at_example_com-1a2b3c4d_20260806_7").is_some());
        assert!(parse_dir_name("no_date_here").is_none());
        assert!(parse_dir_name("x_20260806_notanumber").is_none());
        assert!(parse_dir_name("_20260806_1").is_none());
    }
}
