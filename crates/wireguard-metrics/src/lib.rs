//! Prometheus metrics for `WireGuard` devices.
//!
//! `wireguard-metrics` turns the device/peer snapshots produced by a
//! [`wireguard_device::DeviceSource`] into OpenMetrics samples. Each scrape
//! lists devices exactly once; nothing is cached between scrapes.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use wireguard_device::{Device, StaticSource};
//! use wireguard_metrics::{ExporterRegistry, PeerNames, WireGuardCollector};
//!
//! let source = Arc::new(StaticSource::new(vec![Device::new("wg0")]));
//! let names = PeerNames::parse_inline("").unwrap();
//! let registry = ExporterRegistry::new(WireGuardCollector::new(source, names));
//!
//! let text = registry.encode().unwrap();
//! assert!(text.contains("wireguard_device_peers{device=\"wg0\"} 0"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collector;
pub mod error;
pub mod peers;
pub mod registry;
pub mod schema;

// Re-export main types at crate root
pub use collector::WireGuardCollector;
pub use error::{MetricsError, PeerNamesError, Result};
pub use peers::PeerNames;
pub use registry::{ExporterRegistry, MetricsResponse, CONTENT_TYPE};
pub use schema::{LabelValue, MetricDescriptor, MetricKind, DESCRIPTORS};
