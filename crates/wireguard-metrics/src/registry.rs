//! Registry wrapper serving the `WireGuard` collector.
//!
//! The registry is built once at startup and never mutated afterwards, so it
//! is shared behind an [`Arc`] and encoded concurrently without locking.

use std::sync::Arc;

use prometheus_client::encoding::text::encode;
use prometheus_client::registry::Registry;

use crate::collector::WireGuardCollector;
use crate::error::{MetricsError, Result};

/// Content type of the OpenMetrics text exposition.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Immutable registry holding the `WireGuard` collector.
#[derive(Clone)]
pub struct ExporterRegistry {
    registry: Arc<Registry>,
}

impl std::fmt::Debug for ExporterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterRegistry").finish_non_exhaustive()
    }
}

impl ExporterRegistry {
    /// Creates a registry with `collector` registered.
    #[must_use]
    pub fn new(collector: WireGuardCollector) -> Self {
        let mut registry = Registry::default();
        registry.register_collector(Box::new(collector));
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Runs one collect cycle and renders it as OpenMetrics text.
    ///
    /// This lists devices and may block; call it off the async runtime.
    pub fn encode(&self) -> Result<String> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry).map_err(|e| MetricsError::Encode {
            reason: e.to_string(),
        })?;
        Ok(buffer)
    }

    /// Runs one collect cycle and packages it as an HTTP-ready response.
    pub fn scrape(&self) -> Result<MetricsResponse> {
        Ok(MetricsResponse {
            body: self.encode()?,
            content_type: Self::content_type(),
        })
    }

    /// Returns the Content-Type header value for the exposition.
    #[must_use]
    pub const fn content_type() -> &'static str {
        CONTENT_TYPE
    }
}

/// One rendered scrape.
#[derive(Debug, Clone)]
pub struct MetricsResponse {
    /// The exposition text.
    pub body: String,
    /// The Content-Type header value.
    pub content_type: &'static str,
}
