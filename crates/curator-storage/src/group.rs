//! Storage groups: one master drive plus numbered backup slots.

use crate::drive::StorageDrive;
use curator_core::{reflect_members, Indexer, MemberAccess};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Position of a drive within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotId {
    /// The master drive
    Master,
    /// A numbered backup slot
    Backup(u32),
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => f.write_str("master"),
            Self::Backup(n) => write!(f, "backup.{n}"),
        }
    }
}

/// A named set of drives holding the same media.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageGroup {
    /// Group identifier (the key in the storage map)
    pub id: String,
    /// Display name
    pub name: String,
    /// Master drive
    pub master: Option<StorageDrive>,
    /// Backup drives by slot number
    pub backup: BTreeMap<u32, StorageDrive>,
    /// Named logical paths relative to the drive root
    pub paths: BTreeMap<String, String>,
}

impl StorageGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a group from a persisted configuration section.
    ///
    /// Only numerically keyed backup entries are honoured; other keys are
    /// skipped. A backup table without any numeric key yields no backups.
    #[must_use]
    pub fn from_config(id: &str, section: &Value) -> Self {
        let name = text_member(section, "name").unwrap_or_else(|| id.to_string());
        let mut group = Self::new(id, name);

        if let Some(master) = section.try_get("master").filter(Value::is_object) {
            group.master = Some(drive_from_config(&master));
        }

        if let Some(Value::Object(backups)) = section.try_get("backup") {
            for (key, entry) in &backups {
                let Ok(slot) = key.trim().parse::<u32>() else {
                    debug!(group = id, key = %key, "skipping non-numeric backup slot");
                    continue;
                };
                if !entry.is_object() {
                    warn!(group = id, key = %key, "backup slot is not a table; skipped");
                    continue;
                }
                if group.backup.insert(slot, drive_from_config(entry)).is_some() {
                    warn!(
                        group = id,
                        key = %key,
                        slot,
                        "backup slot defined more than once; later entry wins"
                    );
                }
            }
        }

        if let Some(Value::Object(paths)) = section.try_get("paths") {
            for (name, path) in &paths {
                if let Some(path) = path.as_str() {
                    group.paths.insert(name.clone(), path.to_string());
                }
            }
        }

        group
    }

    /// A group is valid when its master is assigned and currently available.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.master.as_ref().is_some_and(|m| m.available)
    }

    /// Look up a drive by slot.
    #[must_use]
    pub fn slot(&self, slot: SlotId) -> Option<&StorageDrive> {
        match slot {
            SlotId::Master => self.master.as_ref(),
            SlotId::Backup(n) => self.backup.get(&n),
        }
    }

    /// All drives, master first, then backups in slot order.
    pub fn drives(&self) -> impl Iterator<Item = (SlotId, &StorageDrive)> {
        self.master
            .iter()
            .map(|d| (SlotId::Master, d))
            .chain(self.backup.iter().map(|(n, d)| (SlotId::Backup(*n), d)))
    }

    /// Mutable access to all drives, in the same order as [`Self::drives`].
    pub fn drives_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut StorageDrive)> {
        self.master
            .iter_mut()
            .map(|d| (SlotId::Master, d))
            .chain(self.backup.iter_mut().map(|(n, d)| (SlotId::Backup(*n), d)))
    }
}

fn text_member(section: &Value, name: &str) -> Option<String> {
    section
        .try_get(name)
        .and_then(|value| value.as_str().map(str::to_string))
}

fn drive_from_config(section: &Value) -> StorageDrive {
    StorageDrive::configured(
        text_member(section, "label").unwrap_or_default(),
        text_member(section, "serial_number").unwrap_or_default(),
    )
}

/// Backup slots are addressable directly by number, e.g. `storage.1.2.label`.
impl Indexer for StorageGroup {
    fn index_get(&self, key: &str) -> Option<Value> {
        let slot = key.trim().parse::<u32>().ok()?;
        let drive = self.backup.get(&slot)?;
        serde_json::to_value(drive).ok()
    }

    fn index_set(&mut self, key: &str, value: Value) -> bool {
        let Ok(slot) = key.trim().parse::<u32>() else {
            return false;
        };
        match serde_json::from_value::<StorageDrive>(value) {
            Ok(drive) => {
                self.backup.insert(slot, drive);
                true
            }
            Err(_) => false,
        }
    }
}

reflect_members!(indexed: StorageGroup);
