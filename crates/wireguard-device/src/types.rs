//! Core types for `WireGuard` device state.

use std::fmt;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use ipnet::IpNet;

use crate::keys::PublicKey;

/// A `WireGuard` network interface as observed at one point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    /// Interface name, e.g. `wg0`.
    pub name: String,
    /// The interface's own public key, if a private key is configured.
    pub public_key: Option<PublicKey>,
    /// Listen port, if one is bound.
    pub listen_port: Option<u16>,
    /// Firewall mark applied to outgoing packets, if set.
    pub firewall_mark: Option<u32>,
    /// Peers in the order the backend reported them.
    pub peers: Vec<Peer>,
}

impl Device {
    /// Creates a device with no peers and no optional attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_key: None,
            listen_port: None,
            firewall_mark: None,
            peers: Vec::new(),
        }
    }

    /// Sets the interface public key.
    #[must_use]
    pub fn with_public_key(mut self, key: PublicKey) -> Self {
        self.public_key = Some(key);
        self
    }

    /// Sets the listen port.
    #[must_use]
    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_port = Some(port);
        self
    }

    /// Sets the firewall mark.
    #[must_use]
    pub fn with_firewall_mark(mut self, mark: u32) -> Self {
        self.firewall_mark = Some(mark);
        self
    }

    /// Adds a peer.
    #[must_use]
    pub fn with_peer(mut self, peer: Peer) -> Self {
        self.peers.push(peer);
        self
    }

    /// Whether the name is usable as an interface identity.
    ///
    /// Interface names are non-empty and never contain whitespace or control
    /// characters.
    #[must_use]
    pub fn has_valid_name(&self) -> bool {
        !self.name.is_empty()
            && !self
                .name
                .chars()
                .any(|c| c.is_whitespace() || c.is_control())
    }
}

/// A peer configured on a [`Device`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peer {
    /// The peer's public key.
    pub public_key: PublicKey,
    /// Last known endpoint.
    pub endpoint: Option<SocketAddr>,
    /// Networks this peer may send traffic from.
    pub allowed_ips: Vec<IpNet>,
    /// Time of the last completed handshake; `None` if it never happened.
    pub last_handshake: Option<DateTime<Utc>>,
    /// Bytes received from this peer.
    pub rx_bytes: u64,
    /// Bytes transmitted to this peer.
    pub tx_bytes: u64,
    /// Persistent keepalive interval in seconds; `None` when disabled.
    pub persistent_keepalive: Option<u16>,
}

impl Peer {
    /// Creates a new peer with the given public key.
    #[must_use]
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            endpoint: None,
            allowed_ips: Vec::new(),
            last_handshake: None,
            rx_bytes: 0,
            tx_bytes: 0,
            persistent_keepalive: None,
        }
    }

    /// Sets the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: SocketAddr) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Adds an allowed IP network.
    #[must_use]
    pub fn with_allowed_ip(mut self, network: IpNet) -> Self {
        self.allowed_ips.push(network);
        self
    }

    /// Sets the last handshake time.
    #[must_use]
    pub fn with_last_handshake(mut self, at: DateTime<Utc>) -> Self {
        self.last_handshake = Some(at);
        self
    }

    /// Sets the cumulative transfer counters.
    #[must_use]
    pub fn with_transfer(mut self, rx_bytes: u64, tx_bytes: u64) -> Self {
        self.rx_bytes = rx_bytes;
        self.tx_bytes = tx_bytes;
        self
    }

    /// Sets the persistent keepalive interval. Zero disables it.
    #[must_use]
    pub fn with_persistent_keepalive(mut self, seconds: u16) -> Self {
        self.persistent_keepalive = (seconds != 0).then_some(seconds);
        self
    }
}

/// Address family of an allowed IP network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4.
    V4,
    /// IPv6.
    V6,
}

impl AddressFamily {
    /// Returns the family of a network.
    #[must_use]
    pub const fn of(network: &IpNet) -> Self {
        match network {
            IpNet::V4(_) => Self::V4,
            IpNet::V6(_) => Self::V6,
        }
    }

    /// Label-friendly name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V4 => "IPv4",
            Self::V6 => "IPv6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
