//! # wireguard-exporter
//!
//! Prometheus exporter for `WireGuard` devices and peers.
//!
//! Serves the samples produced by [`wireguard_metrics::WireGuardCollector`]
//! over HTTP, built on the axum framework. Each scrape lists devices once;
//! listing failures are reported in-band through `wireguard_scrape_error`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wireguard_exporter::{startup, ExporterConfig, ExporterServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ExporterConfig::default().with_peer_names("keyA:alice");
//!     let registry = startup::build_registry(&config)?;
//!     let server = ExporterServer::new(config, registry)?;
//!     server.serve().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/metrics` (configurable) | GET | OpenMetrics exposition |
//! | anything else | any | `301` redirect to the metrics path |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod startup;
pub mod state;

pub use cli::{Cli, LogFormat, Source};
pub use config::{ExporterConfig, SourceKind};
pub use error::{ExporterError, ExporterResult};
pub use routes::create_router;
pub use server::ExporterServer;
pub use state::ExporterState;
