//! Device listing through `wg show all dump`.
//!
//! The dump format is tab separated, one line per interface followed by one
//! line per peer of that interface:
//!
//! ```text
//! <ifname> <private-key> <public-key> <listen-port> <fwmark>
//! <ifname> <public-key> <preshared-key> <endpoint> <allowed-ips> <latest-handshake> <rx> <tx> <keepalive>
//! ```
//!
//! Absent values are printed as `(none)`, `off` or `0`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use chrono::{DateTime, Utc};
use ipnet::IpNet;
use tracing::debug;

use crate::error::{DeviceError, Result};
use crate::keys::PublicKey;
use crate::source::DeviceSource;
use crate::types::{Device, Peer};

const INTERFACE_FIELDS: usize = 5;
const PEER_FIELDS: usize = 9;
const NONE: &str = "(none)";
const OFF: &str = "off";

/// Parses the output of `wg show all dump`.
///
/// Lines that cannot be parsed are skipped, as are peers whose interface line
/// was missing or malformed. Devices and peers keep the order of the input.
#[must_use]
pub fn parse_dump(output: &str) -> Vec<Device> {
    let mut devices: Vec<Device> = Vec::new();

    for (index, line) in output.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();

        match fields.len() {
            INTERFACE_FIELDS => match parse_interface(&fields) {
                Ok(device) => devices.push(device),
                Err(reason) => debug!(line = index + 1, reason, "skipping interface line"),
            },
            PEER_FIELDS => {
                let Some(device) = devices.iter_mut().rev().find(|d| d.name == fields[0]) else {
                    debug!(line = index + 1, interface = fields[0], "skipping peer of unknown interface");
                    continue;
                };
                match parse_peer(&fields[1..]) {
                    Ok(peer) => device.peers.push(peer),
                    Err(reason) => debug!(line = index + 1, reason, "skipping peer line"),
                }
            }
            count => debug!(line = index + 1, fields = count, "skipping unrecognised dump line"),
        }
    }

    devices
}

fn parse_interface(fields: &[&str]) -> std::result::Result<Device, &'static str> {
    let name = fields[0];
    if name.is_empty() {
        return Err("empty interface name");
    }
    let mut device = Device::new(name);

    if fields[2] != NONE {
        device.public_key = Some(PublicKey::from_base64(fields[2]).map_err(|_| "invalid public key")?);
    }

    let port: u16 = fields[3].parse().map_err(|_| "invalid listen port")?;
    device.listen_port = (port != 0).then_some(port);

    device.firewall_mark = match fields[4] {
        OFF => None,
        mark => Some(parse_fwmark(mark).ok_or("invalid fwmark")?).filter(|m| *m != 0),
    };

    Ok(device)
}

fn parse_fwmark(value: &str) -> Option<u32> {
    match value.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn parse_peer(fields: &[&str]) -> std::result::Result<Peer, &'static str> {
    let public_key = PublicKey::from_base64(fields[0]).map_err(|_| "invalid public key")?;
    let mut peer = Peer::new(public_key);

    if fields[2] != NONE {
        peer.endpoint = Some(fields[2].parse::<SocketAddr>().map_err(|_| "invalid endpoint")?);
    }

    if fields[3] != NONE && !fields[3].is_empty() {
        peer.allowed_ips = fields[3]
            .split(',')
            .map(|cidr| cidr.trim().parse::<IpNet>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| "invalid allowed ips")?;
    }

    let handshake: i64 = fields[4].parse().map_err(|_| "invalid latest handshake")?;
    peer.last_handshake = if handshake == 0 {
        None
    } else {
        Some(DateTime::<Utc>::from_timestamp(handshake, 0).ok_or("handshake out of range")?)
    };

    peer.rx_bytes = fields[5].parse().map_err(|_| "invalid rx bytes")?;
    peer.tx_bytes = fields[6].parse().map_err(|_| "invalid tx bytes")?;

    peer.persistent_keepalive = match fields[7] {
        OFF => None,
        seconds => Some(seconds.parse::<u16>().map_err(|_| "invalid keepalive")?).filter(|s| *s != 0),
    };

    Ok(peer)
}

/// Lists devices by running `wg show all dump`.
///
/// Works with both the kernel module and userspace implementations, since
/// `wg` talks to whichever one owns the interface.
#[derive(Debug, Clone)]
pub struct DumpSource {
    program: PathBuf,
}

impl DumpSource {
    /// Creates a source that runs the given `wg` executable.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The `wg` executable this source runs.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command_line(&self) -> String {
        format!("{} show all dump", self.program.display())
    }
}

impl Default for DumpSource {
    fn default() -> Self {
        Self::new("wg")
    }
}

impl DeviceSource for DumpSource {
    fn devices(&self) -> Result<Vec<Device>> {
        let output = Command::new(&self.program)
            .args(["show", "all", "dump"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DeviceError::Command {
                command: self.command_line(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeviceError::Command {
                command: self.command_line(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_dump(&stdout))
    }
}
