//! Serial-number reconciliation against the live-device provider.
//!
//! Configured drives are matched to attached devices by trimmed serial
//! number only. The first live drive with an equal serial wins; drives
//! without a configured serial are never adopted by serial and only count
//! as available when their recorded mount path is currently enumerated.

use crate::group::{SlotId, StorageGroup};
use crate::provider::{LiveDeviceProvider, LiveDrive};
use curator_core::Result;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Reference to a configured drive in the storage map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveRef {
    /// Group identifier
    pub group_id: String,
    /// Slot within the group
    pub slot: SlotId,
    /// Configured serial number (trimmed, may be empty)
    pub serial_number: String,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Drives that were found attached
    pub matched: Vec<DriveRef>,
    /// Drives that are not attached (left unavailable)
    pub unmatched: Vec<DriveRef>,
    /// Serial numbers reported by more than one live device
    pub duplicate_live_serials: Vec<String>,
}

impl ReconcileReport {
    /// Unmatched drives belonging to `group_id`.
    pub fn unmatched_in<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a DriveRef> {
        self.unmatched.iter().filter(move |r| r.group_id == group_id)
    }
}

/// Reconcile every configured group against the devices attached now.
///
/// Enumerates once, then for each drive: serial-bearing drives adopt the
/// mount path of the first live drive with the same serial; all drives then
/// refresh availability and capacity. Unmatched drives keep their last mount
/// path and are marked unavailable.
pub fn reconcile(
    groups: &mut BTreeMap<String, StorageGroup>,
    provider: &dyn LiveDeviceProvider,
) -> Result<ReconcileReport> {
    let live = provider.list_drives()?;
    debug!(count = live.len(), "enumerated live drives");

    let mut report = ReconcileReport {
        duplicate_live_serials: duplicate_serials(&live),
        ..ReconcileReport::default()
    };
    for serial in &report.duplicate_live_serials {
        warn!(serial = %serial, "serial number reported by several devices; first match wins");
    }

    for (group_id, group) in groups.iter_mut() {
        for (slot, drive) in group.drives_mut() {
            let drive_ref = DriveRef {
                group_id: group_id.clone(),
                slot,
                serial_number: drive.serial().to_string(),
            };

            let found = if drive.has_serial() {
                live.iter().find(|l| l.serial() == drive.serial())
            } else if drive.mount_path.trim().is_empty() {
                None
            } else {
                live.iter().find(|l| l.mount_path == drive.mount_path)
            };

            match found {
                Some(live_drive) => {
                    if drive.has_serial() && drive.mount_path != live_drive.mount_path {
                        debug!(
                            group = %group_id,
                            slot = %slot,
                            from = %drive.mount_path,
                            to = %live_drive.mount_path,
                            "updated drive mount path"
                        );
                        drive.mount_path.clone_from(&live_drive.mount_path);
                    }
                    drive.refresh_from(live_drive);
                    report.matched.push(drive_ref);
                }
                None => {
                    drive.mark_unavailable();
                    report.unmatched.push(drive_ref);
                }
            }
        }
    }

    info!(
        matched = report.matched.len(),
        unmatched = report.unmatched.len(),
        "storage reconciliation complete"
    );
    Ok(report)
}

fn duplicate_serials(live: &[LiveDrive]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for drive in live.iter().filter(|d| !d.serial().is_empty()) {
        *seen.entry(drive.serial()).or_default() += 1;
    }
    let mut duplicates: Vec<String> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(serial, _)| serial.to_string())
        .collect();
    duplicates.sort();
    duplicates
}
