//! HTTP request handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::error::{ExporterError, ExporterResult};
use crate::state::ExporterState;

/// Handle GET on the metrics path - run one collect cycle.
///
/// Listing devices may block on a process spawn or a netlink round trip, so
/// the scrape runs on the blocking pool. Listing failures are reported in the
/// exposition itself; only encoding failures turn into an error response.
pub async fn get_metrics(State(state): State<Arc<ExporterState>>) -> ExporterResult<Response> {
    let registry = state.registry().clone();
    let scrape = tokio::task::spawn_blocking(move || registry.scrape())
        .await
        .map_err(|e| ExporterError::Internal(format!("scrape task failed: {e}")))??;

    debug!(bytes = scrape.body.len(), "served scrape");
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, scrape.content_type)],
        scrape.body,
    )
        .into_response())
}

/// Handle any other path - redirect permanently to the metrics path.
pub async fn redirect_to_metrics(State(state): State<Arc<ExporterState>>) -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, state.metrics_path().to_string())],
    )
        .into_response()
}
