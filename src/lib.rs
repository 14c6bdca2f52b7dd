//! promptfx-server: per-user sound effect generation service.
//!
//! This library provides the core of the service: isolated on-disk
//! storage per authenticated user, validated generation requests, and
//! owner-only artifact access. Model inference and token verification
//! are pluggable seams ([`SoundGenerator`], [`auth::TokenVerifier`]).
//!
//! # Modules
//!
//! - [`storage`]: Per-user directories, metadata, and the access gate
//! - [`generation`]: The generator seam and the request pipeline
//! - [`http`]: The axum surface over the core components
//! - [`config`]: Runtime configuration (ServerConfig)
//! - [`error`]: Error codes and types (ServiceError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use promptfx_server::{
//!     generation::{GenerationPipeline, ToneGenerator},
//!     storage::{DirectoryAllocator, IdentityKey, MetadataStore},
//!     types::GenerateRequest,
//! };
//!
//! let allocator = Arc::new(DirectoryAllocator::open("./users")?);
//! let pipeline = GenerationPipeline::new(
//!     allocator,
//!     Arc::new(MetadataStore::new()),
//!     Arc::new(ToneGenerator::new()),
//! );
//!
//! let descriptor = pipeline.run(
//!     &IdentityKey::derive("alice@example.com"),
//!     &GenerateRequest {
//!         prompt: "rain on a tin roof".to_string(),
//!         filename: "rain".to_string(),
//!         num_of_steps: 250,
//!         duration: 5,
//!     },
//! )?;
//! ```

pub mod audio;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod http;
pub mod storage;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::ServerConfig;
pub use error::{ErrorCode, Result, ServiceError};
pub use generation::{GenerationPipeline, SoundGenerator, ToneGenerator};
pub use storage::{AccessGate, DirectoryAllocator, IdentityKey, MetadataStore, UserDirectory};
pub use types::{ArtifactDescriptor, ArtifactEntry, GenerateRequest};
