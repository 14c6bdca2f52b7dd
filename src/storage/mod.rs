//! Per-user on-disk storage.
//!
//! One directory per identity under a content root, with artifact files
//! and a JSON metadata store inside each, plus the access gate that keeps
//! every artifact private to its owner.

mod access;
mod allocator;
mod identity;
mod metadata;

// Re-export commonly used items
pub use access::AccessGate;
pub use allocator::{DirectoryAllocator, UserDirectory, ARTIFACT_SUBDIR, METADATA_FILE};
pub use identity::IdentityKey;
pub use metadata::MetadataStore;
