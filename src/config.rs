//! Service configuration module.
//!
//! Contains the runtime configuration for the service, including the
//! content root, bind address, and authentication token map location.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default bind address for the HTTP server.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Runtime configuration for the service.
///
/// This configuration is typically loaded from command-line arguments
/// or environment variables at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Content root holding one subdirectory per user.
    /// If None, uses the platform-specific default data location.
    pub content_root: Option<PathBuf>,

    /// Address to bind the HTTP server on.
    /// If None, uses [`DEFAULT_BIND`].
    pub bind: Option<SocketAddr>,

    /// Path to a JSON file mapping bearer tokens to email addresses.
    /// If None, every request is rejected as unauthenticated.
    pub auth_tokens: Option<PathBuf>,
}

impl ServerConfig {
    /// Creates a new ServerConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ServerConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `PROMPTFX_CONTENT_ROOT` - Content root directory
    /// - `PROMPTFX_BIND` - Bind address (e.g. 127.0.0.1:5000)
    /// - `PROMPTFX_AUTH_TOKENS` - Path to the token map file
    ///
    /// Falls back to defaults for unset variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("PROMPTFX_CONTENT_ROOT") {
            config.content_root = Some(PathBuf::from(path));
        }

        if let Ok(bind_str) = std::env::var("PROMPTFX_BIND") {
            if let Ok(addr) = bind_str.parse::<SocketAddr>() {
                config.bind = Some(addr);
            }
        }

        if let Ok(path) = std::env::var("PROMPTFX_AUTH_TOKENS") {
            config.auth_tokens = Some(PathBuf::from(path));
        }

        config
    }

    /// Returns the effective content root, using platform defaults if not
    /// specified.
    pub fn effective_content_root(&self) -> PathBuf {
        if let Some(ref path) = self.content_root {
            path.clone()
        } else {
            default_content_root()
        }
    }

    /// Returns the effective bind address.
    pub fn effective_bind(&self) -> SocketAddr {
        self.bind.unwrap_or_else(|| {
            DEFAULT_BIND
                .parse()
                .expect("default bind address is well-formed")
        })
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if let Some(ref root) = self.content_root {
            if root.exists() && !root.is_dir() {
                return Some(format!(
                    "content root {} exists but is not a directory",
                    root.display()
                ));
            }
        }

        if let Some(ref tokens) = self.auth_tokens {
            if !tokens.is_file() {
                return Some(format!("token map {} is not a file", tokens.display()));
            }
        }

        None
    }
}

/// Returns the platform-specific default content root.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Application Support/promptfx/users
/// - Linux: ~/.local/share/promptfx/users
/// - Windows: C:\Users\<user>\AppData\Local\promptfx\data\users
fn default_content_root() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "promptfx") {
        proj_dirs.data_local_dir().join("users")
    } else {
        // Fallback to current directory
        PathBuf::from("./users")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_paths_are_non_empty() {
        let config = ServerConfig::new();
        assert!(!config.effective_content_root().as_os_str().is_empty());
    }

    #[test]
    fn effective_bind_default() {
        let config = ServerConfig::new();
        assert_eq!(config.effective_bind().port(), 5000);
    }

    #[test]
    fn explicit_paths_win() {
        let config = ServerConfig {
            content_root: Some(PathBuf::from("/srv/promptfx")),
            ..Default::default()
        };
        assert_eq!(config.effective_content_root(), PathBuf::from("/srv/promptfx"));
    }

    #[test]
    fn validation_accepts_defaults() {
        assert!(ServerConfig::new().validate().is_none());
    }

    #[test]
    fn validation_rejects_missing_token_map() {
        let config = ServerConfig {
            auth_tokens: Some(PathBuf::from("/definitely/not/here.json")),
            ..Default::default()
        };
        assert!(config.validate().is_some());
    }

    #[test]
    fn validation_rejects_file_as_content_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        std::fs::write(&file, "x").unwrap();

        let config = ServerConfig {
            content_root: Some(file),
            ..Default::default()
        };
        assert!(config.validate().is_some());
    }
}
