//! Route configuration for the exporter.

use std::sync::Arc;

use axum::routing::{get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{get_metrics, redirect_to_metrics};
use crate::state::ExporterState;

/// Create the exporter router.
///
/// The metrics path must already be validated; axum rejects route patterns
/// that are not plain paths.
pub fn create_router(state: Arc<ExporterState>) -> Router {
    let metrics_path = state.metrics_path().to_string();

    Router::new()
        .route(&metrics_path, get(get_metrics))
        .fallback(redirect_to_metrics)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
