//! Internal listener: `/health` and `/metrics`.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;

use crate::metrics::RelayMetrics;

/// Creates the health and metrics router.
pub fn router(metrics: Arc<RelayMetrics>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .with_state(metrics)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn render_metrics(State(metrics): State<Arc<RelayMetrics>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, RelayMetrics::content_type())],
        metrics.encode(),
    )
}
