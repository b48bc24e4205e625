//! The fixed metric schema.
//!
//! Names, help texts and label sets here are a public contract: dashboards and
//! alerts depend on them. Counter names are listed without the `_total`
//! suffix, which the OpenMetrics encoder appends.

use std::fmt::Write;

use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue, LabelValueEncoder};
use prometheus_client::metrics::MetricType;

/// Whether a metric is a gauge or a counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Value that can go up and down.
    Gauge,
    /// Monotonically increasing value.
    Counter,
}

impl MetricKind {
    /// The `prometheus-client` metric type.
    #[must_use]
    pub const fn metric_type(self) -> MetricType {
        match self {
            Self::Gauge => MetricType::Gauge,
            Self::Counter => MetricType::Counter,
        }
    }
}

/// Static description of one metric the collector can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetricDescriptor {
    /// Metric name, without the `_total` suffix for counters.
    pub name: &'static str,
    /// Help text.
    pub help: &'static str,
    /// Gauge or counter.
    pub kind: MetricKind,
    /// Label names, in exposition order.
    pub labels: &'static [&'static str],
}

impl MetricDescriptor {
    /// Name as it appears on sample lines.
    #[must_use]
    pub fn exposition_name(&self) -> String {
        match self.kind {
            MetricKind::Gauge => self.name.to_string(),
            MetricKind::Counter => format!("{}_total", self.name),
        }
    }
}

const DEVICE: &[&str] = &["device"];
const PEER: &[&str] = &["device", "peer", "peer_name"];

/// Whether the device listing failed.
pub const SCRAPE_ERROR: MetricDescriptor = MetricDescriptor {
    name: "wireguard_scrape_error",
    help: "1 if listing WireGuard devices failed during this scrape, 0 otherwise.",
    kind: MetricKind::Gauge,
    labels: &[],
};

/// Device metadata, always 1.
pub const DEVICE_INFO: MetricDescriptor = MetricDescriptor {
    name: "wireguard_device_info",
    help: "Metadata about a WireGuard device.",
    kind: MetricKind::Gauge,
    labels: &["device", "public_key"],
};

/// Peer count per device.
pub const DEVICE_PEERS: MetricDescriptor = MetricDescriptor {
    name: "wireguard_device_peers",
    help: "Number of peers configured on a WireGuard device.",
    kind: MetricKind::Gauge,
    labels: DEVICE,
};

/// Listen port per device.
pub const DEVICE_LISTEN_PORT: MetricDescriptor = MetricDescriptor {
    name: "wireguard_device_listen_port",
    help: "UDP port a WireGuard device listens on, 0 if none.",
    kind: MetricKind::Gauge,
    labels: DEVICE,
};

/// Firewall mark per device.
pub const DEVICE_FIREWALL_MARK: MetricDescriptor = MetricDescriptor {
    name: "wireguard_device_firewall_mark",
    help: "Firewall mark applied to outgoing packets of a WireGuard device, 0 if none.",
    kind: MetricKind::Gauge,
    labels: DEVICE,
};

/// Peer metadata, always 1.
pub const PEER_INFO: MetricDescriptor = MetricDescriptor {
    name: "wireguard_peer_info",
    help: "Metadata about a peer. The peer label is the peer's public key.",
    kind: MetricKind::Gauge,
    labels: &["device", "peer", "peer_name", "endpoint"],
};

/// One series per allowed subnet.
pub const PEER_ALLOWED_IPS_INFO: MetricDescriptor = MetricDescriptor {
    name: "wireguard_peer_allowed_ips_info",
    help: "Allowed IP subnets of a peer, one series per subnet.",
    kind: MetricKind::Gauge,
    labels: &["device", "peer", "peer_name", "allowed_ips", "family"],
};

/// Bytes received per peer.
pub const PEER_RECEIVE_BYTES: MetricDescriptor = MetricDescriptor {
    name: "wireguard_peer_receive_bytes",
    help: "Number of bytes received from a peer.",
    kind: MetricKind::Counter,
    labels: PEER,
};

/// Bytes sent per peer.
pub const PEER_TRANSMIT_BYTES: MetricDescriptor = MetricDescriptor {
    name: "wireguard_peer_transmit_bytes",
    help: "Number of bytes transmitted to a peer.",
    kind: MetricKind::Counter,
    labels: PEER,
};

/// Last handshake time per peer.
pub const PEER_LAST_HANDSHAKE: MetricDescriptor = MetricDescriptor {
    name: "wireguard_peer_last_handshake_seconds",
    help: "UNIX timestamp of the last handshake with a peer, 0 if none.",
    kind: MetricKind::Gauge,
    labels: PEER,
};

/// Seconds since the last handshake per peer.
pub const PEER_HANDSHAKE_AGE: MetricDescriptor = MetricDescriptor {
    name: "wireguard_peer_handshake_age_seconds",
    help: "Seconds since the last handshake with a peer, -1 if none.",
    kind: MetricKind::Gauge,
    labels: PEER,
};

/// Keepalive interval per peer.
pub const PEER_PERSISTENT_KEEPALIVE: MetricDescriptor = MetricDescriptor {
    name: "wireguard_peer_persistent_keepalive_seconds",
    help: "Persistent keepalive interval of a peer, 0 if disabled.",
    kind: MetricKind::Gauge,
    labels: PEER,
};

/// Every metric the collector can emit, in exposition order.
pub const DESCRIPTORS: &[MetricDescriptor] = &[
    SCRAPE_ERROR,
    DEVICE_INFO,
    DEVICE_PEERS,
    DEVICE_LISTEN_PORT,
    DEVICE_FIREWALL_MARK,
    PEER_INFO,
    PEER_ALLOWED_IPS_INFO,
    PEER_RECEIVE_BYTES,
    PEER_TRANSMIT_BYTES,
    PEER_LAST_HANDSHAKE,
    PEER_HANDSHAKE_AGE,
    PEER_PERSISTENT_KEEPALIVE,
];

/// A label value escaped for the text exposition.
///
/// The encoder writes label values verbatim, so backslashes, double quotes
/// and line feeds are escaped here. Peer names come from operator input and
/// may contain any of them.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct LabelValue(String);

impl From<String> for LabelValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for LabelValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl EncodeLabelValue for LabelValue {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), std::fmt::Error> {
        let mut rest = self.0.as_str();
        while let Some(at) = rest.find(['\\', '"', '\n']) {
            encoder.write_str(&rest[..at])?;
            let escaped = match rest.as_bytes()[at] {
                b'\\' => "\\\\",
                b'"' => "\\\"",
                _ => "\\n",
            };
            encoder.write_str(escaped)?;
            rest = &rest[at + 1..];
        }
        encoder.write_str(rest)
    }
}

/// Labels for `wireguard_device_info`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct DeviceInfoLabels {
    /// Interface name.
    pub device: LabelValue,
    /// Interface public key, base64; empty if unset.
    pub public_key: LabelValue,
}

/// Labels for device-level metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct DeviceLabels {
    /// Interface name.
    pub device: LabelValue,
}

/// Labels for `wireguard_peer_info`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PeerInfoLabels {
    /// Interface name.
    pub device: LabelValue,
    /// Peer public key, base64.
    pub peer: LabelValue,
    /// Friendly peer name; empty if unmapped.
    pub peer_name: LabelValue,
    /// Last known endpoint; empty if unknown.
    pub endpoint: LabelValue,
}

/// Labels for `wireguard_peer_allowed_ips_info`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct AllowedIpLabels {
    /// Interface name.
    pub device: LabelValue,
    /// Peer public key, base64.
    pub peer: LabelValue,
    /// Friendly peer name; empty if unmapped.
    pub peer_name: LabelValue,
    /// Allowed subnet in CIDR notation.
    pub allowed_ips: LabelValue,
    /// `IPv4` or `IPv6`.
    pub family: LabelValue,
}

/// Labels for peer-level metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PeerLabels {
    /// Interface name.
    pub device: LabelValue,
    /// Peer public key, base64.
    pub peer: LabelValue,
    /// Friendly peer name; empty if unmapped.
    pub peer_name: LabelValue,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = DESCRIPTORS.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), DESCRIPTORS.len());
    }

    #[test]
    fn names_are_prefixed() {
        for descriptor in DESCRIPTORS {
            assert!(
                descriptor.name.starts_with("wireguard_"),
                "{} lacks prefix",
                descriptor.name
            );
            assert!(!descriptor.name.ends_with("_total"));
        }
    }

    #[test]
    fn counters_get_total_suffix() {
        assert_eq!(
            PEER_RECEIVE_BYTES.exposition_name(),
            "wireguard_peer_receive_bytes_total"
        );
        assert_eq!(DEVICE_PEERS.exposition_name(), "wireguard_device_peers");
    }

    #[test]
    fn only_byte_counts_are_counters() {
        let counters: Vec<_> = DESCRIPTORS
            .iter()
            .filter(|d| d.kind == MetricKind::Counter)
            .map(|d| d.name)
            .collect();
        assert_eq!(
            counters,
            vec!["wireguard_peer_receive_bytes", "wireguard_peer_transmit_bytes"]
        );
    }

    #[test]
    fn peer_metrics_carry_peer_identity() {
        for descriptor in DESCRIPTORS.iter().filter(|d| d.name.starts_with("wireguard_peer_")) {
            assert_eq!(&descriptor.labels[..3], PEER, "{}", descriptor.name);
        }
    }

    #[test]
    fn device_metrics_carry_device_label() {
        for descriptor in DESCRIPTORS
            .iter()
            .filter(|d| d.name.starts_with("wireguard_device_"))
        {
            assert_eq!(descriptor.labels[0], "device", "{}", descriptor.name);
        }
    }

    mod label_value_tests {
        use prometheus_client::encoding::text::encode;
        use prometheus_client::metrics::family::Family;
        use prometheus_client::metrics::gauge::Gauge;
        use prometheus_client::registry::Registry;
        use test_case::test_case;

        use super::*;

        fn rendered(value: &str) -> String {
            let family = Family::<DeviceLabels, Gauge>::default();
            family
                .get_or_create(&DeviceLabels {
                    device: value.into(),
                })
                .set(1);
            let mut registry = Registry::default();
            registry.register("label_check", "Label rendering.", family);
            let mut out = String::new();
            encode(&mut out, &registry).unwrap();
            out.lines()
                .find_map(|line| line.strip_prefix("label_check{device=\""))
                .and_then(|rest| rest.strip_suffix("\"} 1"))
                .unwrap()
                .to_string()
        }

        #[test_case("wg0", "wg0" ; "plain")]
        #[test_case("al\"ice", "al\\\"ice" ; "quote")]
        #[test_case("a\\b", "a\\\\b" ; "backslash")]
        #[test_case("al\nbob", "al\\nbob" ; "line feed")]
        #[test_case("\"\\\n", "\\\"\\\\\\n" ; "only specials")]
        #[test_case("", "" ; "empty")]
        #[test_case("zoë", "zoë" ; "non ascii")]
        fn escapes_specials(raw: &str, expected: &str) {
            assert_eq!(rendered(raw), expected);
        }
    }
}
