//! Error types for the wireguard-metrics crate.

use thiserror::Error;

/// Errors raised while building the peer name mapping.
///
/// All of these are startup-time configuration errors.
#[derive(Debug, Error)]
pub enum PeerNamesError {
    /// An inline `key:name` element did not split into exactly two fields.
    #[error("failed to parse {entry:?} as a valid public key and peer name")]
    InvalidEntry {
        /// The offending element.
        entry: String,
    },

    /// The peer file is not a valid mapping document.
    #[error("invalid peer names document: {reason}")]
    Document {
        /// What was wrong with the document.
        reason: String,
    },

    /// The peer file could not be read.
    #[error("failed to read peer names document: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for PeerNamesError {
    fn from(err: toml::de::Error) -> Self {
        Self::Document {
            reason: err.to_string(),
        }
    }
}

/// Errors that can occur while exposing metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Rendering the exposition text failed.
    #[error("failed to encode metrics: {reason}")]
    Encode {
        /// The reason encoding failed.
        reason: String,
    },
}

/// Result type for metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
