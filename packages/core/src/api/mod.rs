//! HTTP API assembly.

pub mod headers;
pub mod health;
pub mod predictions;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::metrics::AppMetrics;
use predictions::PredictionsState;

/// Build the complete application router.
///
/// The dashboard frontend is served from a different origin, so CORS is
/// wide open: the original deployment allowed all origins, methods, and
/// headers.
pub fn create_router(state: PredictionsState) -> Router {
    let metrics = state.metrics.clone();

    Router::new()
        .route("/predict", get(predictions::get_predictions))
        .route(
            "/dashboard/api/predictions",
            get(predictions::get_predictions),
        )
        .with_state(state)
        .route("/health", get(health::health))
        .route("/metrics", {
            let metrics = metrics.clone();
            get(move || render_metrics(metrics.clone()))
        })
        .layer(middleware::from_fn_with_state(metrics, track_http_metrics))
        .layer(CorsLayer::permissive())
}

/// Record request count and latency for every route.
async fn track_http_metrics(
    State(metrics): State<Arc<AppMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let timer = metrics.http_request_duration.start_timer();
    let response = next.run(request).await;
    timer.observe_duration();

    metrics
        .http_requests_total
        .with_label_values(&[method.as_str(), &path, response.status().as_str()])
        .inc();
    response
}

async fn render_metrics(metrics: Arc<AppMetrics>) -> Response {
    match metrics.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header("content-type", "text/plain; version=0.0.4")
            .body(Body::from(body))
            .expect("metrics response should be valid"),
        Err(err) => {
            tracing::error!("Failed to render metrics: {}", err);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::empty())
                .expect("metrics error response should be valid")
        }
    }
}
