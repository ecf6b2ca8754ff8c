use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const LIVENESS_PATH: &str = "/s3g/health/live";
pub const METRICS_PATH: &str = "/metrics";

pub(crate) struct HttpState {
    metrics: PrometheusHandle,
}

pub(crate) fn router(metrics: PrometheusHandle) -> Router {
    Router::new()
        .route(LIVENESS_PATH, get(live))
        .route(METRICS_PATH, get(render_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(HttpState { metrics }))
}

async fn live() -> StatusCode {
    StatusCode::OK
}

async fn render_metrics(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
