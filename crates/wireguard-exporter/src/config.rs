//! Exporter configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{ExporterError, ExporterResult};

/// Default listen port, as allocated for this exporter in the Prometheus
/// default port registry.
pub const DEFAULT_PORT: u16 = 9586;

/// Default path the exposition is served on.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Default `wg` executable.
pub const DEFAULT_WG_PATH: &str = "wg";

/// Which backend lists devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Run `wg show all dump`.
    #[default]
    Wg,
    /// Read kernel devices over netlink.
    Kernel,
}

/// Configuration for the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
    /// Path the exposition is served on; every other path redirects here.
    pub metrics_path: String,
    /// Inline `key:name` peer names.
    pub peer_names: Option<String>,
    /// TOML peer names file, overriding inline entries.
    pub peer_file: Option<PathBuf>,
    /// Device listing backend.
    pub source: SourceKind,
    /// `wg` executable used by the dump backend.
    pub wg_path: PathBuf,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
            peer_names: None,
            peer_file: None,
            source: SourceKind::default(),
            wg_path: PathBuf::from(DEFAULT_WG_PATH),
        }
    }
}

impl ExporterConfig {
    /// Create a new configuration with the specified listen address.
    #[must_use]
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Self::default()
        }
    }

    /// Set the metrics path.
    #[must_use]
    pub fn with_metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = path.into();
        self
    }

    /// Set the inline peer names.
    #[must_use]
    pub fn with_peer_names(mut self, names: impl Into<String>) -> Self {
        self.peer_names = Some(names.into());
        self
    }

    /// Set the peer names file.
    #[must_use]
    pub fn with_peer_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.peer_file = Some(path.into());
        self
    }

    /// Set the device listing backend.
    #[must_use]
    pub const fn with_source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    /// Set the `wg` executable.
    #[must_use]
    pub fn with_wg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.wg_path = path.into();
        self
    }

    /// Checks the configuration for values that can never work.
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::InvalidConfig`] if the metrics path is not an
    /// absolute URL path, or the kernel backend was requested in a build
    /// without it.
    pub fn validate(&self) -> ExporterResult<()> {
        if !self.metrics_path.starts_with('/') {
            return Err(ExporterError::InvalidConfig(format!(
                "metrics path must start with '/', got {:?}",
                self.metrics_path
            )));
        }
        // Braces, colons and stars would be read as route captures.
        if self
            .metrics_path
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | ':' | '*'))
        {
            return Err(ExporterError::InvalidConfig(format!(
                "metrics path must be a plain URL path, got {:?}",
                self.metrics_path
            )));
        }
        if self.source == SourceKind::Kernel && !cfg!(feature = "linux") {
            return Err(ExporterError::InvalidConfig(
                "kernel source requires a build with the `linux` feature".to_string(),
            ));
        }
        if self.wg_path.as_os_str().is_empty() {
            return Err(ExporterError::InvalidConfig("wg path must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use test_case::test_case;

    use super::*;

    #[test]
    fn default_config() {
        let config = ExporterConfig::default();

        assert_eq!(config.listen_addr.port(), 9586);
        assert_eq!(config.metrics_path, "/metrics");
        assert!(config.peer_names.is_none());
        assert!(config.peer_file.is_none());
        assert_eq!(config.source, SourceKind::Wg);
        assert_eq!(config.wg_path, PathBuf::from("wg"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9000);
        let config = ExporterConfig::new(addr)
            .with_metrics_path("/wg")
            .with_peer_names("abc:alice")
            .with_peer_file("/etc/wireguard/peers.toml")
            .with_wg_path("/usr/bin/wg");

        assert_eq!(config.listen_addr, addr);
        assert_eq!(config.metrics_path, "/wg");
        assert_eq!(config.peer_names.as_deref(), Some("abc:alice"));
        assert_eq!(
            config.peer_file,
            Some(PathBuf::from("/etc/wireguard/peers.toml"))
        );
        assert_eq!(config.wg_path, PathBuf::from("/usr/bin/wg"));
    }

    #[test_case("metrics" ; "relative")]
    #[test_case("" ; "empty")]
    #[test_case("/my metrics" ; "whitespace")]
    #[test_case("/{device}" ; "capture")]
    #[test_case("/*rest" ; "wildcard")]
    fn invalid_metrics_path(path: &str) {
        let config = ExporterConfig::default().with_metrics_path(path);
        assert!(matches!(
            config.validate(),
            Err(ExporterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_wg_path() {
        let config = ExporterConfig::default().with_wg_path("");
        assert!(config.validate().is_err());
    }

    #[cfg(not(feature = "linux"))]
    #[test]
    fn kernel_source_needs_feature() {
        let config = ExporterConfig::default().with_source(SourceKind::Kernel);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("linux"));
    }

    #[cfg(feature = "linux")]
    #[test]
    fn kernel_source_with_feature() {
        let config = ExporterConfig::default().with_source(SourceKind::Kernel);
        assert!(config.validate().is_ok());
    }
}
