// Collector HTTP routes: liveness, latest collected metrics, build version

mod http;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::collector_worker::LatestMetrics;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) latest: LatestMetrics,
}

pub fn app(latest: LatestMetrics) -> Router {
    let state = AppState { latest };
    Router::new()
        .route("/healthz", get(http::healthz_handler)) // GET /healthz
        .route("/metrics", get(http::metrics_handler)) // GET /metrics
        .route("/version", get(http::version_handler)) // GET /version
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
