//! Exporter server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use wireguard_metrics::ExporterRegistry;

use crate::config::ExporterConfig;
use crate::error::{ExporterError, ExporterResult};
use crate::routes::create_router;
use crate::state::ExporterState;

/// HTTP server exposing the `WireGuard` metrics.
#[derive(Debug, Clone)]
pub struct ExporterServer {
    state: Arc<ExporterState>,
}

impl ExporterServer {
    /// Create a new server.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: ExporterConfig, registry: ExporterRegistry) -> ExporterResult<Self> {
        config.validate()?;
        let state = Arc::new(ExporterState::new(config, registry));
        Ok(Self { state })
    }

    /// Get the server state.
    #[must_use]
    pub fn state(&self) -> Arc<ExporterState> {
        self.state.clone()
    }

    /// Start the server on the configured address and serve until a fatal
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self) -> ExporterResult<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server stops accepting connections when `shutdown` completes and
    /// returns once in-flight scrapes finish.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(&self, shutdown: F) -> ExporterResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config().listen_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ExporterError::BindFailed(addr, e))?;

        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails.
    pub async fn serve_listener<F>(&self, listener: TcpListener, shutdown: F) -> ExporterResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = listener
            .local_addr()
            .map_err(|e| ExporterError::Internal(e.to_string()))?;
        info!(
            addr = %addr,
            path = %self.state.metrics_path(),
            "exporter listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ExporterError::Internal(e.to_string()))?;

        info!("exporter shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use wireguard_device::{Device, StaticSource};
    use wireguard_metrics::{PeerNames, WireGuardCollector};

    use super::*;

    fn make_registry() -> ExporterRegistry {
        let source = Arc::new(StaticSource::new(vec![Device::new("wg0")]));
        ExporterRegistry::new(WireGuardCollector::new(source, PeerNames::new()))
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ExporterConfig::default().with_metrics_path("metrics");
        let result = ExporterServer::new(config, make_registry());
        assert!(matches!(result, Err(ExporterError::InvalidConfig(_))));
    }

    #[test]
    fn server_state() {
        let server = ExporterServer::new(ExporterConfig::default(), make_registry()).unwrap();
        assert_eq!(server.state().metrics_path(), "/metrics");
    }

    #[tokio::test]
    async fn bind_conflict() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let server = ExporterServer::new(ExporterConfig::new(addr), make_registry()).unwrap();
        let result = server.serve_with_shutdown(async {}).await;

        assert!(matches!(result, Err(ExporterError::BindFailed(a, _)) if a == addr));
    }

    #[tokio::test]
    async fn serve_and_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = ExporterServer::new(ExporterConfig::new(addr), make_registry()).unwrap();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            server
                .serve_listener(listener, async {
                    let _ = stop_rx.await;
                })
                .await
        });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("wireguard_device_peers{device=\"wg0\"} 0"));

        stop_tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
