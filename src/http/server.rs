//! HTTP server wiring.
//!
//! Builds the router over shared service state and serves it. The router
//! is separate from `serve` so tests can drive it in-process.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::auth::TokenVerifier;
use crate::generation::GenerationPipeline;
use crate::storage::AccessGate;

use super::handlers;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GenerationPipeline>,
    pub gate: Arc<AccessGate>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    /// Creates new server state.
    pub fn new(
        pipeline: Arc<GenerationPipeline>,
        gate: Arc<AccessGate>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            pipeline,
            gate,
            verifier,
        }
    }
}

/// Builds the service router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/generate", post(handlers::generate))
        .route("/audio/:filename", get(handlers::audio))
        .route("/my-sounds", get(handlers::my_sounds))
        .with_state(state)
}

/// Binds `addr` and serves the router until the process exits.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, build_router(state)).await
}
