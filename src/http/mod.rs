//! HTTP surface for the service.
//!
//! Thin axum layer over the core components: authentication, routing,
//! and error-to-status mapping live here.

pub mod handlers;
pub mod server;
pub mod types;

// Re-export commonly used items
pub use server::{build_router, serve, AppState};
pub use types::{ErrorBody, GenerateResponse, SoundListing};
