//! HTTP surface for the security assessment engine.
//!
//! Two routes: `GET /health` for liveness and `POST /security_check` for
//! scoring an operating point. Requests the engine rejects come back as
//! `400` with a `{"detail": ...}` body; everything the engine tolerates
//! (dropped records, absent branch data) stays a `200`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Extension};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use gridsec_core::{Assessment, GridsecError, Limits, ScoreWeights};
use gridsec_engine::SecurityEngine;

/// Body cap applied when `--max-body-bytes` is not given.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Shared state handed to every request handler.
pub struct AppState {
    pub engine: SecurityEngine,
}

/// Envelope accepted by `POST /security_check`. Absent `limits` means
/// the standard operating band.
#[derive(Deserialize)]
struct SecurityRequest {
    pf: serde_json::Value,
    #[serde(default)]
    limits: Limits,
}

#[derive(Serialize)]
struct Health {
    ok: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// Engine rejection carried out of a handler. Renders as `400` with the
/// error's display text under `"detail"`.
struct ApiError(GridsecError);

impl From<GridsecError> for ApiError {
    fn from(err: GridsecError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(reason = self.0.reason(), "rejected security check: {}", self.0);
        let body = ErrorBody {
            detail: self.0.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Assemble the application router around shared state.
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/security_check", post(security_check))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(Extension(state))
}

/// Read scoring weights from a JSON file. Missing fields fall back to
/// the defaults, so a file may override a single multiplier.
pub fn load_weights(path: &Path) -> Result<ScoreWeights> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading weights file {}", path.display()))?;
    let weights: ScoreWeights = serde_json::from_str(&content)
        .with_context(|| format!("parsing weights file {}", path.display()))?;
    Ok(weights)
}

async fn health() -> Json<Health> {
    Json(Health { ok: true })
}

async fn security_check(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<SecurityRequest>,
) -> Result<Json<Assessment>, ApiError> {
    let assessment = state.engine.assess(&request.pf, &request.limits)?;
    info!(
        score = assessment.score,
        n_viol = assessment.summary.n_viol,
        "assessed operating point"
    );
    Ok(Json(assessment))
}
