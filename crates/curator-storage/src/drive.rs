//! Storage drive value object.

use crate::provider::LiveDrive;
use curator_core::reflect_members;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A configured storage drive.
///
/// The serial number is the identity key: equality and hashing consider only
/// the trimmed serial number. The mount path, availability and capacity are
/// runtime state refreshed by reconciliation and never part of identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageDrive {
    /// Display name
    pub label: String,
    /// Stable hardware identifier
    pub serial_number: String,
    /// Current mount path or drive letter (volatile)
    pub mount_path: String,
    /// Whether the drive is currently attached
    pub available: bool,
    /// Free capacity in bytes
    pub free_bytes: u64,
    /// Total capacity in bytes
    pub total_bytes: u64,
}

impl StorageDrive {
    /// Create a drive as it appears in persisted configuration: label and
    /// serial number only, not yet available.
    #[must_use]
    pub fn configured(label: impl Into<String>, serial_number: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            serial_number: serial_number.into(),
            ..Self::default()
        }
    }

    /// Create a drive from a live enumeration entry.
    #[must_use]
    pub fn from_live(live: &LiveDrive) -> Self {
        Self {
            label: live.label.clone(),
            serial_number: live.serial_number.clone(),
            mount_path: live.mount_path.clone(),
            available: true,
            free_bytes: live.free_bytes,
            total_bytes: live.total_bytes,
        }
    }

    /// The serial number without surrounding whitespace.
    #[must_use]
    pub fn serial(&self) -> &str {
        self.serial_number.trim()
    }

    /// Whether a serial number is configured.
    #[must_use]
    pub fn has_serial(&self) -> bool {
        !self.serial().is_empty()
    }

    /// Adopt availability and capacity from a live entry.
    pub fn refresh_from(&mut self, live: &LiveDrive) {
        self.available = true;
        self.free_bytes = live.free_bytes;
        self.total_bytes = live.total_bytes;
    }

    /// Mark the drive as not attached. The mount path is kept as last seen.
    pub fn mark_unavailable(&mut self) {
        self.available = false;
        self.free_bytes = 0;
        self.total_bytes = 0;
    }

    /// Used capacity as a percentage, when the total is known.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn used_percent(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        let used = self.total_bytes.saturating_sub(self.free_bytes);
        Some(used as f64 / self.total_bytes as f64 * 100.0)
    }
}

impl PartialEq for StorageDrive {
    fn eq(&self, other: &Self) -> bool {
        self.serial() == other.serial()
    }
}

impl Eq for StorageDrive {}

impl Hash for StorageDrive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serial().hash(state);
    }
}

reflect_members!(StorageDrive);
