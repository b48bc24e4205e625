//! Command-line argument parsing with clap.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{ExporterConfig, SourceKind, DEFAULT_METRICS_PATH, DEFAULT_WG_PATH};

/// Prometheus exporter for WireGuard devices and peers.
///
/// Every scrape lists devices once and blocks until the listing finishes; no
/// internal timeout is applied, so configure the Prometheus scrape timeout
/// accordingly.
#[derive(Parser, Debug, Clone)]
#[command(name = "wireguard-exporter")]
#[command(version, about)]
pub struct Cli {
    /// Address to listen on for scrapes; `:port` binds all interfaces.
    #[arg(
        long = "web.listen-address",
        env = "WIREGUARD_EXPORTER_LISTEN_ADDRESS",
        default_value = "0.0.0.0:9586",
        value_parser = parse_listen_address
    )]
    pub listen_address: SocketAddr,

    /// Path under which to expose metrics; every other path redirects here.
    #[arg(
        long = "web.telemetry-path",
        visible_alias = "metrics.path",
        env = "WIREGUARD_EXPORTER_METRICS_PATH",
        default_value = DEFAULT_METRICS_PATH
    )]
    pub metrics_path: String,

    /// Friendly peer names, e.g. "keyA:alice,keyB:bob".
    #[arg(long = "wireguard.peer-names", env = "WIREGUARD_EXPORTER_PEER_NAMES")]
    pub peer_names: Option<String>,

    /// TOML file of friendly peer names; entries override --wireguard.peer-names.
    #[arg(long = "wireguard.peer-file", env = "WIREGUARD_EXPORTER_PEER_FILE")]
    pub peer_file: Option<PathBuf>,

    /// How to list devices.
    #[arg(
        long = "wireguard.source",
        env = "WIREGUARD_EXPORTER_SOURCE",
        value_enum,
        default_value_t = Source::Wg
    )]
    pub source: Source,

    /// Path of the `wg` tool used by the `wg` source.
    #[arg(
        long = "wireguard.wg-path",
        env = "WIREGUARD_EXPORTER_WG_PATH",
        default_value = DEFAULT_WG_PATH
    )]
    pub wg_path: PathBuf,

    /// Default log level; RUST_LOG takes precedence when set.
    #[arg(long = "log.level", env = "WIREGUARD_EXPORTER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format.
    #[arg(
        long = "log.format",
        env = "WIREGUARD_EXPORTER_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,
}

/// Device listing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Source {
    /// Run `wg show all dump`; works for kernel and userspace devices.
    #[default]
    Wg,
    /// Read kernel devices over netlink (requires the `linux` feature).
    Kernel,
}

/// Log output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl From<Source> for SourceKind {
    fn from(source: Source) -> Self {
        match source {
            Source::Wg => Self::Wg,
            Source::Kernel => Self::Kernel,
        }
    }
}

impl Cli {
    /// Converts the arguments into an exporter configuration.
    ///
    /// The result is not validated yet.
    #[must_use]
    pub fn to_config(&self) -> ExporterConfig {
        ExporterConfig {
            listen_addr: self.listen_address,
            metrics_path: self.metrics_path.clone(),
            peer_names: self.peer_names.clone(),
            peer_file: self.peer_file.clone(),
            source: self.source.into(),
            wg_path: self.wg_path.clone(),
        }
    }
}

/// Parses a listen address, accepting `:port` as shorthand for all
/// interfaces.
fn parse_listen_address(value: &str) -> Result<SocketAddr, String> {
    let full = match value.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => value.to_string(),
    };
    full.parse()
        .map_err(|e| format!("invalid listen address {value:?}: {e}"))
}
