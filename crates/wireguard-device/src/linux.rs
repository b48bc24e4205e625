//! Linux kernel `WireGuard` devices via the netlink API.
//!
//! Wraps `defguard_wireguard_rs` to read interface state directly from the
//! kernel module, without the `wg` tool. Interfaces are discovered through
//! sysfs: every entry of `/sys/class/net` whose `uevent` declares
//! `DEVTYPE=wireguard`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use defguard_wireguard_rs::host::{Host, Peer as DgPeer};
use defguard_wireguard_rs::{Kernel, WGApi, WireguardInterfaceApi};
use ipnet::IpNet;
use tracing::debug;

use crate::error::{DeviceError, Result};
use crate::keys::PublicKey;
use crate::source::DeviceSource;
use crate::types::{Device, Peer};

const SYSFS_NET: &str = "/sys/class/net";

/// Lists kernel `WireGuard` interfaces over netlink.
///
/// Requires `CAP_NET_ADMIN`.
#[derive(Debug, Clone)]
pub struct KernelSource {
    sysfs_root: PathBuf,
}

impl KernelSource {
    /// Creates a source reading interfaces from `/sys/class/net`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sysfs_root: PathBuf::from(SYSFS_NET),
        }
    }

    /// Names of all `WireGuard` interfaces, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the sysfs directory cannot be read.
    pub fn interface_names(&self) -> Result<Vec<String>> {
        wireguard_interfaces(&self.sysfs_root)
    }
}

impl Default for KernelSource {
    fn default() -> Self {
        Self::new()
    }
}

fn wireguard_interfaces(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        // Interfaces can disappear between listing and reading.
        let Ok(uevent) = fs::read_to_string(entry.path().join("uevent")) else {
            continue;
        };
        if uevent.lines().any(|l| l.trim() == "DEVTYPE=wireguard") {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn to_public_key(key: &defguard_wireguard_rs::key::Key) -> PublicKey {
    PublicKey::from_bytes_array(key.as_array())
}

fn to_peer(dg_peer: &DgPeer) -> Peer {
    let allowed_ips = dg_peer
        .allowed_ips
        .iter()
        .filter_map(|aip| aip.to_string().parse::<IpNet>().ok())
        .collect();

    Peer {
        public_key: to_public_key(&dg_peer.public_key),
        endpoint: dg_peer.endpoint,
        allowed_ips,
        // The kernel reports a zero timestamp for peers that never handshaked.
        last_handshake: dg_peer
            .last_handshake
            .filter(|t| *t != SystemTime::UNIX_EPOCH)
            .map(DateTime::<Utc>::from),
        rx_bytes: dg_peer.rx_bytes,
        tx_bytes: dg_peer.tx_bytes,
        persistent_keepalive: dg_peer.persistent_keepalive_interval.filter(|s| *s != 0),
    }
}

/// `Host` keeps the mark private; its UAPI rendering is the only public view.
fn firewall_mark(host: &Host) -> Option<u32> {
    host.as_uapi()
        .lines()
        .find_map(|line| line.strip_prefix("fwmark="))
        .and_then(|mark| mark.parse().ok())
        .filter(|mark| *mark != 0)
}

fn to_device(name: &str, host: &Host) -> Device {
    let mut peers: Vec<Peer> = host.peers.values().map(to_peer).collect();
    // The kernel hands peers back in hash order; sort for stable output.
    peers.sort_by_key(|p| p.public_key);

    Device {
        name: name.to_string(),
        public_key: host.private_key.as_ref().map(|k| to_public_key(&k.public_key())),
        listen_port: Some(host.listen_port).filter(|p| *p != 0),
        firewall_mark: firewall_mark(host),
        peers,
    }
}

impl DeviceSource for KernelSource {
    fn devices(&self) -> Result<Vec<Device>> {
        let names = self.interface_names()?;
        let mut devices = Vec::with_capacity(names.len());

        for name in names {
            let api = WGApi::<Kernel>::new(name.clone()).map_err(|e| DeviceError::Kernel {
                interface: name.clone(),
                reason: format!("WGApi::new: {e}"),
            })?;
            let host = api.read_interface_data().map_err(|e| DeviceError::Kernel {
                interface: name.clone(),
                reason: format!("read_interface_data: {e}"),
            })?;
            debug!(interface = %name, peers = host.peers.len(), "read kernel interface");
            devices.push(to_device(&name, &host));
        }

        Ok(devices)
    }
}
