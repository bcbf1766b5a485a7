// GET handlers: healthz, metrics, version

use axum::{extract::State, http::header, response::IntoResponse};

use super::AppState;
use crate::version::{NAME, VERSION};

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// GET /healthz: liveness only; provider health is reported inside /metrics.
pub(super) async fn healthz_handler() -> &'static str {
    "ok"
}

/// GET /metrics: the latest collection cycle in exposition format.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.latest.body().await,
    )
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}
