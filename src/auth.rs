//! Identity verification boundary.
//!
//! The service only needs `verify(token) -> identity`; how tokens are
//! minted and checked belongs to the deployment's identity provider.
//! [`StaticTokenVerifier`] backs development and tests with a plain token
//! map loaded from a JSON file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, ServiceError};

/// A verified caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Verified email address.
    pub email: String,
}

/// Verifies bearer tokens into caller identities.
///
/// Implementations never expose token internals to the rest of the
/// service; a failed verification is always [`ErrorCode::Unauthenticated`].
///
/// [`ErrorCode::Unauthenticated`]: crate::error::ErrorCode::Unauthenticated
pub trait TokenVerifier: Send + Sync {
    /// Verifies a bearer token, returning the caller's identity.
    fn verify(&self, token: &str) -> Result<Identity>;
}

/// Token map verifier for development and tests.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    /// Creates a verifier from a token -> email map.
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Loads a verifier from a JSON file mapping token to email.
    pub fn from_file(path: &Path) -> Result<Self> {
        let body = fs::read_to_string(path).map_err(|e| {
            ServiceError::storage_io(format!("failed to read token map {}", path.display()), e)
        })?;
        let tokens: HashMap<String, String> = serde_json::from_str(&body).map_err(|e| {
            ServiceError::with_source(
                crate::error::ErrorCode::StorageUnavailable,
                format!("invalid token map {}", path.display()),
                e,
            )
        })?;
        Ok(Self::new(tokens))
    }

    /// Registers a token for an email address.
    pub fn insert(&mut self, token: impl Into<String>, email: impl Into<String>) {
        self.tokens.insert(token.into(), email.into());
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<Identity> {
        self.tokens
            .get(token)
            .map(|email| Identity {
                email: email.clone(),
            })
            .ok_or_else(|| ServiceError::unauthenticated("Invalid or missing token"))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
