//! Startup steps run before the server accepts scrapes.
//!
//! Every failure here is a deployment error and aborts startup.

use std::fs::File;
use std::io::Read;
use std::sync::Arc;

use tracing::info;
use wireguard_device::{DeviceSource, DumpSource};
use wireguard_metrics::{ExporterRegistry, PeerNames, WireGuardCollector};

use crate::config::{ExporterConfig, SourceKind};
use crate::error::{ExporterError, ExporterResult};

/// Builds the peer name mapping from the inline list and the peer file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or either source is
/// malformed.
pub fn load_peer_names(config: &ExporterConfig) -> ExporterResult<PeerNames> {
    let mut file = match &config.peer_file {
        Some(path) => Some(File::open(path).map_err(|source| ExporterError::PeerFile {
            path: path.clone(),
            source,
        })?),
        None => None,
    };

    let names = PeerNames::resolve(
        config.peer_names.as_deref(),
        file.as_mut().map(|f| f as &mut dyn Read),
    )?;
    info!(peers = names.len(), "loaded peer names");
    Ok(names)
}

/// Builds the configured device source.
///
/// # Errors
///
/// Returns an error if the kernel source is requested in a build without the
/// `linux` feature.
pub fn build_source(config: &ExporterConfig) -> ExporterResult<Arc<dyn DeviceSource>> {
    match config.source {
        SourceKind::Wg => Ok(Arc::new(DumpSource::new(&config.wg_path))),
        #[cfg(feature = "linux")]
        SourceKind::Kernel => Ok(Arc::new(wireguard_device::KernelSource::new())),
        #[cfg(not(feature = "linux"))]
        SourceKind::Kernel => Err(ExporterError::InvalidConfig(
            "kernel source requires a build with the `linux` feature".to_string(),
        )),
    }
}

/// Lists devices once to surface permission or transport problems at startup.
///
/// # Errors
///
/// Returns [`ExporterError::Probe`] if listing fails.
pub fn probe(source: &dyn DeviceSource) -> ExporterResult<usize> {
    let devices = source.devices()?;
    let peers: usize = devices.iter().map(|d| d.peers.len()).sum();
    info!(devices = devices.len(), peers, "WireGuard devices reachable");
    Ok(devices.len())
}

/// Runs every startup step and returns the ready registry.
///
/// # Errors
///
/// Returns the first failing step's error.
pub fn build_registry(config: &ExporterConfig) -> ExporterResult<ExporterRegistry> {
    config.validate()?;
    let names = load_peer_names(config)?;
    let source = build_source(config)?;
    probe(source.as_ref())?;
    Ok(ExporterRegistry::new(WireGuardCollector::new(source, names)))
}
