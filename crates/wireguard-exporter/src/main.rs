//! wireguard-exporter - Prometheus exporter for `WireGuard`.
//!
//! Exposes device and peer statistics of every `WireGuard` interface on the
//! host for Prometheus to scrape.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wireguard_exporter::{startup, Cli, ExporterServer, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    let config = cli.to_config();
    info!(
        listen = %config.listen_addr,
        path = %config.metrics_path,
        source = ?config.source,
        "starting wireguard-exporter"
    );

    let registry = startup::build_registry(&config).context("startup failed")?;
    let server = ExporterServer::new(config, registry)?;
    server.serve_with_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` overrides `level` when set.
fn init_tracing(level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(fmt::layer()).try_init()?,
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
    }
    Ok(())
}

/// Completes on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
