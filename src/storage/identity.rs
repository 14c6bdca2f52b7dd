//! Identity key derivation.
//!
//! A verified identity (an email address) is mapped to a filesystem-safe
//! key that prefixes the user's directory name. The sanitized email keeps
//! directory names readable; the truncated SHA-256 digest keeps distinct
//! emails from colliding after sanitization.

use std::fmt;

use sha2::{Digest, Sha256};

/// Number of digest bytes appended to the sanitized email (8 hex chars).
const DIGEST_BYTES: usize = 4;

/// A filesystem-safe, collision-resistant key for a verified identity.
///
/// Keys are immutable once derived; the same email always produces the
/// same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Derives the key for a verified email address.
    pub fn derive(email: &str) -> Self {
        let mut sanitized = email.replace('@', "_at_").replace('.', "_");
        sanitized.retain(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if sanitized.is_empty() {
            sanitized.push_str("user");
        }

        let mut hasher = Sha256::new();
        hasher.update(email.as_bytes());
        let digest = hasher.finalize();

        IdentityKey(format!(
            "{}-{}",
            sanitized,
            hex::encode(&digest[..DIGEST_BYTES])
        ))
    }

    /// Reconstructs a key parsed back out of a directory name.
    pub(crate) fn from_raw(raw: impl Into<String>) -> Self {
        IdentityKey(raw.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = IdentityKey::derive("alice@example.com");
        let b = IdentityKey::derive("alice@example.com");
        assert_eq!(a, b);
    }

    #[test]
    fn derived_key_is_filesystem_safe() {
        let key = IdentityKey::derive("alice+test@sub.example.com");
        assert!(key
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }

    #[test]
    fn sanitization_collisions_stay_distinct() {
        // Both emails sanitize to the same readable prefix; the digest
        // keeps the keys apart.
        let a = IdentityKey::derive("a.b@example.com");
        let b = IdentityKey::derive("a_b@example.com");
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_emails_produce_distinct_keys() {
        let a = IdentityKey::derive("alice@example.com");
        let b = IdentityKey::derive("bob@example.com");
        assert_ne!(a, b);
    }

    #[test]
    fn readable_prefix_survives() {
        let key = IdentityKey::derive("alice@example.com");
        assert!(key.as_str().starts_with("alice_at_example_com-"));
    }
}
