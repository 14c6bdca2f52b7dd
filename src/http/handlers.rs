//! Request handlers for the HTTP surface.
//!
//! Handlers authenticate, delegate to the core components, and map
//! service errors onto HTTP statuses. The generation call runs on the
//! blocking pool; everything else is quick filesystem work.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::auth::bearer_token;
use crate::error::ServiceError;
use crate::storage::IdentityKey;
use crate::types::GenerateRequest;

use super::server::AppState;
use super::types::{ErrorBody, GenerateResponse, SoundListing};

type ApiResult<T> = std::result::Result<T, ApiError>;

/// A service error on its way out as an HTTP response.
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Full detail stays server-side; clients get the reason only for
        // conditions they can correct.
        let message = if err.code.is_client_error() {
            tracing::debug!(code = %err.code, "request rejected: {}", err.message);
            err.message
        } else {
            tracing::error!(code = %err.code, error = ?err, "request failed");
            "Internal server error".to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Verifies the caller and derives their identity key.
fn authenticate(state: &AppState, headers: &HeaderMap) -> crate::error::Result<IdentityKey> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServiceError::unauthenticated("Invalid or missing token"))?;
    let token =
        bearer_token(header).ok_or_else(|| ServiceError::unauthenticated("Invalid or missing token"))?;
    let identity = state.verifier.verify(token)?;
    Ok(IdentityKey::derive(&identity.email))
}

/// Liveness check.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /generate`: runs one generation request for the caller.
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let key = authenticate(&state, &headers)?;

    // Inference blocks for up to minutes; keep it off the executor.
    let pipeline = state.pipeline.clone();
    let descriptor = tokio::task::spawn_blocking(move || pipeline.run(&key, &request))
        .await
        .map_err(|e| ServiceError::generation_failed(format!("generation task aborted: {}", e)))??;

    Ok(Json(GenerateResponse {
        filename: descriptor.filename,
        prompt: descriptor.prompt,
    }))
}

/// `GET /audio/{filename}`: streams an owned artifact.
pub async fn audio(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let key = authenticate(&state, &headers)?;
    let path = state.gate.resolve_owned(&key, &filename)?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        ServiceError::storage_io(format!("failed to read artifact {}", path.display()), e)
    })?;

    Ok(([(header::CONTENT_TYPE, "audio/wav")], bytes).into_response())
}

/// `GET /my-sounds`: lists the caller's artifacts, newest first.
pub async fn my_sounds(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<SoundListing>>> {
    let key = authenticate(&state, &headers)?;
    let listing = state.gate.list_owned(&key)?;
    Ok(Json(listing.into_iter().map(SoundListing::from).collect()))
}
