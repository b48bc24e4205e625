//! Error types for the exporter server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use wireguard_device::DeviceError;
use wireguard_metrics::{MetricsError, PeerNamesError};

/// Result type alias for exporter operations.
pub type ExporterResult<T> = Result<T, ExporterError>;

/// Errors that can occur in the exporter server.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// The configuration can never work.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The peer names could not be loaded.
    #[error("failed to load peer names: {0}")]
    PeerNames(#[from] PeerNamesError),

    /// The peer names file could not be opened.
    #[error("failed to open peer names file {path}: {source}")]
    PeerFile {
        /// Path of the file.
        path: std::path::PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The startup probe of the device source failed.
    #[error("failed to list WireGuard devices: {0}")]
    Probe(#[from] DeviceError),

    /// Rendering the exposition failed.
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ExporterError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Self::InvalidConfig(_) => (StatusCode::BAD_REQUEST, "invalid_config"),
            Self::Metrics(_) => (StatusCode::INTERNAL_SERVER_ERROR, "metrics_error"),
            Self::BindFailed(_, _)
            | Self::PeerNames(_)
            | Self::PeerFile { .. }
            | Self::Probe(_)
            | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}
