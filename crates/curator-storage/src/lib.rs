//! Curator Storage - drive and group model for media storage.
//!
//! Drives are identified by their hardware serial number. Mount paths are
//! volatile and refreshed from the live-device provider on every
//! reconciliation pass.
//!
//! # Example
//!
//! ```rust
//! use curator_storage::{reconcile, LiveDrive, StaticDrives, StorageDrive, StorageGroup};
//! use std::collections::BTreeMap;
//!
//! # fn main() -> curator_core::Result<()> {
//! let mut group = StorageGroup::new("1", "Photos");
//! group.master = Some(StorageDrive::configured("PhotoMaster", "WD-0001"));
//!
//! let mut groups = BTreeMap::new();
//! groups.insert(group.id.clone(), group);
//!
//! let provider = StaticDrives::new(vec![LiveDrive::new("PhotoMaster", "WD-0001", "/mnt/photos")]);
//! let report = reconcile(&mut groups, &provider)?;
//!
//! assert_eq!(report.matched.len(), 1);
//! assert!(groups["1"].is_valid());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod drive;
pub mod group;
pub mod provider;
pub mod reconcile;

pub use drive::StorageDrive;
pub use group::{SlotId, StorageGroup};
pub use provider::{LiveDeviceProvider, LiveDrive, StaticDrives};
pub use reconcile::{reconcile, DriveRef, ReconcileReport};
