//! The `WireGuard` metrics collector.
//!
//! [`WireGuardCollector`] is a pull-style `prometheus-client` collector: every
//! encode of the registry lists devices once and renders a fresh set of
//! samples. Nothing is cached between scrapes.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use prometheus_client::collector::Collector;
use prometheus_client::encoding::{DescriptorEncoder, EncodeLabelSet, EncodeMetric};
use prometheus_client::metrics::counter::ConstCounter;
use prometheus_client::metrics::gauge::ConstGauge;
use tracing::{debug, warn};
use wireguard_device::{AddressFamily, Device, DeviceSource, Peer};

use crate::peers::PeerNames;
use crate::schema::{
    self, AllowedIpLabels, DeviceInfoLabels, DeviceLabels, MetricDescriptor, PeerInfoLabels,
    PeerLabels,
};

/// Source of the wall clock used for handshake ages.
pub type Clock = fn() -> DateTime<Utc>;

/// Collects `WireGuard` device and peer metrics on every scrape.
#[derive(Clone)]
pub struct WireGuardCollector {
    source: Arc<dyn DeviceSource>,
    names: PeerNames,
    clock: Clock,
}

impl fmt::Debug for WireGuardCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireGuardCollector")
            .field("peer_names", &self.names.len())
            .finish_non_exhaustive()
    }
}

/// A peer that passed validation, with its resolved identity.
struct PeerView<'a> {
    device: &'a str,
    key: String,
    name: String,
    peer: &'a Peer,
}

impl PeerView<'_> {
    fn labels(&self) -> PeerLabels {
        PeerLabels {
            device: self.device.into(),
            peer: self.key.as_str().into(),
            peer_name: self.name.as_str().into(),
        }
    }
}

impl WireGuardCollector {
    /// Creates a collector reading from `source` and labelling peers with
    /// `names`.
    #[must_use]
    pub fn new(source: Arc<dyn DeviceSource>, names: PeerNames) -> Self {
        Self {
            source,
            names,
            clock: Utc::now,
        }
    }

    /// Replaces the wall clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Every metric this collector can emit, independent of live state.
    #[must_use]
    pub fn describe(&self) -> &'static [MetricDescriptor] {
        schema::DESCRIPTORS
    }

    /// Drops devices and peers that cannot be reported.
    fn valid_devices(devices: Vec<Device>) -> Vec<Device> {
        devices
            .into_iter()
            .filter_map(|mut device| {
                if !device.has_valid_name() {
                    warn!(device = ?device.name, "skipping device with invalid name");
                    return None;
                }
                device.peers.retain(|peer| {
                    let keep = !peer.public_key.is_zero();
                    if !keep {
                        warn!(device = %device.name, "skipping peer with unset public key");
                    }
                    keep
                });
                Some(device)
            })
            .collect()
    }

    fn peer_views<'a>(&self, devices: &'a [Device]) -> Vec<PeerView<'a>> {
        devices
            .iter()
            .flat_map(|device| {
                device.peers.iter().map(move |peer| {
                    let key = peer.public_key.to_base64();
                    let name = self.names.get(&key).unwrap_or_default().to_string();
                    PeerView {
                        device: &device.name,
                        key,
                        name,
                        peer,
                    }
                })
            })
            .collect()
    }
}

/// Writes one metric family, skipping it entirely when there are no samples.
fn encode_family<L, M>(
    encoder: &mut DescriptorEncoder<'_>,
    descriptor: MetricDescriptor,
    samples: impl IntoIterator<Item = (L, M)>,
) -> Result<(), fmt::Error>
where
    L: EncodeLabelSet,
    M: EncodeMetric,
{
    let mut samples = samples.into_iter().peekable();
    if samples.peek().is_none() {
        return Ok(());
    }

    let mut family = encoder.encode_descriptor(
        descriptor.name,
        descriptor.help,
        None,
        descriptor.kind.metric_type(),
    )?;
    for (labels, metric) in samples {
        metric.encode(family.encode_family(&labels)?)?;
    }
    Ok(())
}

fn encode_scrape_error(encoder: &mut DescriptorEncoder<'_>, failed: bool) -> Result<(), fmt::Error> {
    let family = encoder.encode_descriptor(
        schema::SCRAPE_ERROR.name,
        schema::SCRAPE_ERROR.help,
        None,
        schema::SCRAPE_ERROR.kind.metric_type(),
    )?;
    ConstGauge::new(i64::from(failed)).encode(family)
}

fn gauge(value: impl Into<i64>) -> ConstGauge<i64> {
    ConstGauge::new(value.into())
}

/// Seconds since `last`, clamped at zero; `-1` if there never was one.
pub(crate) fn handshake_age(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    last.map_or(-1, |at| (now - at).num_seconds().max(0))
}

impl Collector for WireGuardCollector {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), fmt::Error> {
        let devices = match self.source.devices() {
            Ok(devices) => devices,
            Err(err) => {
                warn!(error = %err, "failed to list WireGuard devices");
                return encode_scrape_error(&mut encoder, true);
            }
        };
        let now = (self.clock)();
        let devices = Self::valid_devices(devices);
        let peers = self.peer_views(&devices);
        debug!(devices = devices.len(), peers = peers.len(), "collected WireGuard state");

        encode_scrape_error(&mut encoder, false)?;

        let device_labels = |d: &Device| DeviceLabels {
            device: d.name.as_str().into(),
        };

        encode_family(
            &mut encoder,
            schema::DEVICE_INFO,
            devices.iter().map(|d| {
                let labels = DeviceInfoLabels {
                    device: d.name.as_str().into(),
                    public_key: d.public_key.map(|k| k.to_base64()).unwrap_or_default().into(),
                };
                (labels, gauge(1))
            }),
        )?;
        encode_family(
            &mut encoder,
            schema::DEVICE_PEERS,
            devices.iter().map(|d| {
                let count = i64::try_from(d.peers.len()).unwrap_or(i64::MAX);
                (device_labels(d), gauge(count))
            }),
        )?;
        encode_family(
            &mut encoder,
            schema::DEVICE_LISTEN_PORT,
            devices
                .iter()
                .map(|d| (device_labels(d), gauge(d.listen_port.unwrap_or(0)))),
        )?;
        encode_family(
            &mut encoder,
            schema::DEVICE_FIREWALL_MARK,
            devices
                .iter()
                .map(|d| (device_labels(d), gauge(d.firewall_mark.unwrap_or(0)))),
        )?;

        encode_family(
            &mut encoder,
            schema::PEER_INFO,
            peers.iter().map(|p| {
                let labels = PeerInfoLabels {
                    device: p.device.into(),
                    peer: p.key.as_str().into(),
                    peer_name: p.name.as_str().into(),
                    endpoint: p.peer.endpoint.map(|e| e.to_string()).unwrap_or_default().into(),
                };
                (labels, gauge(1))
            }),
        )?;
        encode_family(
            &mut encoder,
            schema::PEER_ALLOWED_IPS_INFO,
            peers.iter().flat_map(|p| {
                p.peer.allowed_ips.iter().map(move |net| {
                    let labels = AllowedIpLabels {
                        device: p.device.into(),
                        peer: p.key.as_str().into(),
                        peer_name: p.name.as_str().into(),
                        allowed_ips: net.to_string().into(),
                        family: AddressFamily::of(net).as_str().into(),
                    };
                    (labels, gauge(1))
                })
            }),
        )?;
        encode_family(
            &mut encoder,
            schema::PEER_RECEIVE_BYTES,
            peers
                .iter()
                .map(|p| (p.labels(), ConstCounter::new(p.peer.rx_bytes))),
        )?;
        encode_family(
            &mut encoder,
            schema::PEER_TRANSMIT_BYTES,
            peers
                .iter()
                .map(|p| (p.labels(), ConstCounter::new(p.peer.tx_bytes))),
        )?;
        encode_family(
            &mut encoder,
            schema::PEER_LAST_HANDSHAKE,
            peers.iter().map(|p| {
                let at = p.peer.last_handshake.map_or(0, |t| t.timestamp());
                (p.labels(), gauge(at))
            }),
        )?;
        encode_family(
            &mut encoder,
            schema::PEER_HANDSHAKE_AGE,
            peers
                .iter()
                .map(|p| (p.labels(), gauge(handshake_age(p.peer.last_handshake, now)))),
        )?;
        encode_family(
            &mut encoder,
            schema::PEER_PERSISTENT_KEEPALIVE,
            peers
                .iter()
                .map(|p| (p.labels(), gauge(p.peer.persistent_keepalive.unwrap_or(0)))),
        )?;

        Ok(())
    }
}
