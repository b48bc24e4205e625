//! Shared state for the exporter server.

use std::sync::Arc;

use wireguard_metrics::ExporterRegistry;

use crate::config::ExporterConfig;

/// State shared by all request handlers.
///
/// Immutable after startup; handlers only read it.
#[derive(Debug)]
pub struct ExporterState {
    config: Arc<ExporterConfig>,
    registry: ExporterRegistry,
}

impl ExporterState {
    /// Create the state from a validated configuration and a ready registry.
    pub fn new(config: ExporterConfig, registry: ExporterRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry,
        }
    }

    /// Get the exporter configuration.
    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Get the metrics registry.
    pub fn registry(&self) -> &ExporterRegistry {
        &self.registry
    }

    /// Path the exposition is served on.
    pub fn metrics_path(&self) -> &str {
        &self.config.metrics_path
    }
}
