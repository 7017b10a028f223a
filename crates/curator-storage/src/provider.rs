//! Live-device enumeration contract.

use curator_core::Result;
use serde::{Deserialize, Serialize};

/// A currently attached drive as reported by a [`LiveDeviceProvider`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveDrive {
    /// Volume label
    pub label: String,
    /// Hardware serial number
    pub serial_number: String,
    /// Mount path or drive letter
    pub mount_path: String,
    /// Free capacity in bytes
    pub free_bytes: u64,
    /// Total capacity in bytes
    pub total_bytes: u64,
}

impl LiveDrive {
    /// Create a live drive entry with unknown capacity.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        serial_number: impl Into<String>,
        mount_path: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            serial_number: serial_number.into(),
            mount_path: mount_path.into(),
            free_bytes: 0,
            total_bytes: 0,
        }
    }

    /// Set the capacity figures.
    #[must_use]
    pub fn with_capacity(mut self, free_bytes: u64, total_bytes: u64) -> Self {
        self.free_bytes = free_bytes;
        self.total_bytes = total_bytes;
        self
    }

    /// The serial number without surrounding whitespace.
    #[must_use]
    pub fn serial(&self) -> &str {
        self.serial_number.trim()
    }
}

/// Enumerates the storage devices attached right now.
///
/// Calls may block on device I/O; there is no timeout at this layer.
pub trait LiveDeviceProvider {
    /// List every currently enumerable drive.
    fn list_drives(&self) -> Result<Vec<LiveDrive>>;
}

/// A fixed, in-memory device list.
#[derive(Debug, Clone, Default)]
pub struct StaticDrives {
    drives: Vec<LiveDrive>,
}

impl StaticDrives {
    /// Create a provider that always reports `drives`.
    #[must_use]
    pub fn new(drives: Vec<LiveDrive>) -> Self {
        Self { drives }
    }

    /// A provider that reports no drives.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl LiveDeviceProvider for StaticDrives {
    fn list_drives(&self) -> Result<Vec<LiveDrive>> {
        Ok(self.drives.clone())
    }
}
