//! Read-only access to the host's `WireGuard` devices.
//!
//! This crate defines the device/peer model the exporter works with and the
//! [`DeviceSource`] capability that produces it. Two backends are provided:
//!
//! - [`DumpSource`] runs `wg show all dump` (kernel or userspace devices);
//! - `KernelSource` (feature `linux`) reads kernel devices over netlink.
//!
//! Any `Fn() -> Result<Vec<Device>>` closure is also a source.

#![forbid(unsafe_code)]

pub mod dump;
pub mod error;
mod keys;
#[cfg(feature = "linux")]
pub mod linux;
pub mod source;
pub mod types;

pub use dump::{parse_dump, DumpSource};
pub use error::{DeviceError, Result};
pub use keys::{PublicKey, KEY_SIZE};
#[cfg(feature = "linux")]
pub use linux::KernelSource;
pub use source::{DeviceSource, StaticSource};
pub use types::{AddressFamily, Device, Peer};
