//! The device-listing capability.
//!
//! A [`DeviceSource`] returns the current state of every `WireGuard` device on
//! the host. Sources are called once per scrape, possibly from several threads
//! at the same time, and must not cache results between calls.

use std::fmt;

use crate::error::Result;
use crate::types::Device;

/// Something that can list the host's `WireGuard` devices.
pub trait DeviceSource: Send + Sync {
    /// Lists all devices and their peers.
    ///
    /// May block on an OS round trip. Implementations impose no timeout of
    /// their own.
    ///
    /// # Errors
    ///
    /// Returns an error if the device list could not be obtained as a whole.
    fn devices(&self) -> Result<Vec<Device>>;
}

impl<F> DeviceSource for F
where
    F: Fn() -> Result<Vec<Device>> + Send + Sync,
{
    fn devices(&self) -> Result<Vec<Device>> {
        self()
    }
}

/// A source that always returns the same devices.
#[derive(Clone, Default)]
pub struct StaticSource {
    devices: Vec<Device>,
}

impl StaticSource {
    /// Creates a source serving the given devices.
    #[must_use]
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }
}

impl fmt::Debug for StaticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSource")
            .field("devices", &self.devices.len())
            .finish()
    }
}

impl DeviceSource for StaticSource {
    fn devices(&self) -> Result<Vec<Device>> {
        Ok(self.devices.clone())
    }
}
