//! Structural diff between the in-memory configuration and its persisted
//! form.

use crate::source::StructuredDataReader;
use curator_core::{split_path, MemberAccess, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// How a value differs between memory and disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriftKind {
    /// Present only in memory
    Added,
    /// Present only on disk
    Removed,
    /// Present on both sides with different values
    Modified,
}

impl fmt::Display for DriftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        })
    }
}

/// One detected difference.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDrift {
    /// Dot-joined property path
    pub path: String,
    /// Value in memory (null when absent)
    pub runtime_value: Value,
    /// Value on disk (null when absent)
    pub disk_value: Value,
    /// Whether the two sides differ
    pub different: bool,
    /// Classification
    pub kind: DriftKind,
}

impl fmt::Display for ConfigDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DriftKind::Added => write!(f, "+ {} = {}", self.path, self.runtime_value),
            DriftKind::Removed => write!(f, "- {} = {}", self.path, self.disk_value),
            DriftKind::Modified => write!(
                f,
                "~ {}: {} (disk) -> {} (memory)",
                self.path, self.disk_value, self.runtime_value
            ),
        }
    }
}

/// Compares a configuration container against a data source on disk.
pub struct DriftDetector {
    reader: Box<dyn StructuredDataReader>,
    ignored: Vec<Vec<String>>,
}

impl DriftDetector {
    /// Members of the typed model that are derived at runtime and never
    /// persisted. `*` matches any single segment.
    pub const RUNTIME_ONLY_PATHS: &'static [&'static str] = &[
        "version",
        "parameters",
        "paths",
        "secrets",
        "requirements",
        "errors",
        "logging.directory",
        "storage.*.id",
        "storage.*.master.mount_path",
        "storage.*.master.available",
        "storage.*.master.free_bytes",
        "storage.*.master.total_bytes",
        "storage.*.backup.*.mount_path",
        "storage.*.backup.*.available",
        "storage.*.backup.*.free_bytes",
        "storage.*.backup.*.total_bytes",
    ];

    /// Create a detector that loads disk data through `reader`.
    #[must_use]
    pub fn new(reader: Box<dyn StructuredDataReader>) -> Self {
        Self {
            reader,
            ignored: Vec::new(),
        }
    }

    /// Skip these paths (and everything below them) when comparing.
    #[must_use]
    pub fn with_ignored_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored.extend(paths.into_iter().map(|p| {
            split_path(p.as_ref())
                .into_iter()
                .map(str::to_ascii_lowercase)
                .collect()
        }));
        self
    }

    /// Load `disk_path` fresh and compare `runtime` against it.
    pub fn detect_drift(
        &self,
        runtime: &dyn MemberAccess,
        disk_path: &Path,
    ) -> Result<Vec<ConfigDrift>> {
        let disk = self.reader.load(disk_path)?;
        let drift = self.detect_between(runtime, &disk);
        info!(path = %disk_path.display(), drift = drift.len(), "configuration drift detected");
        Ok(drift)
    }

    /// Compare `runtime` against already-loaded disk data.
    ///
    /// A typed runtime container is compared over its declared members only,
    /// and so is every typed section inside it. Open containers are compared
    /// over the union of both sides' keys.
    #[must_use]
    pub fn detect_between(
        &self,
        runtime: &dyn MemberAccess,
        disk: &Map<String, Value>,
    ) -> Vec<ConfigDrift> {
        let mut drift = Vec::new();
        self.compare_container("", runtime, disk, &mut drift);
        drift
    }

    fn compare_container(
        &self,
        prefix: &str,
        runtime: &dyn MemberAccess,
        disk: &Map<String, Value>,
        drift: &mut Vec<ConfigDrift>,
    ) {
        let mut names = runtime.member_names();
        if !runtime.is_typed() {
            for key in disk.keys() {
                if !names.iter().any(|n| n.eq_ignore_ascii_case(key)) {
                    names.push(key.clone());
                }
            }
        }

        for name in names {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            if self.is_ignored(&path) {
                continue;
            }

            let disk_value = disk.try_get(&name);
            if let (Some(section), Some(Value::Object(nested))) =
                (runtime.typed_member(&name), &disk_value)
            {
                if !nested.is_empty() {
                    self.compare_container(&path, section, nested, drift);
                    continue;
                }
            }
            self.compare(&path, runtime.try_get(&name), disk_value, drift);
        }
    }

    fn compare(
        &self,
        path: &str,
        runtime: Option<Value>,
        disk: Option<Value>,
        drift: &mut Vec<ConfigDrift>,
    ) {
        if self.is_ignored(path) {
            return;
        }

        match (present(runtime), present(disk)) {
            (None, None) => {}
            (Some(runtime), None) => drift.push(entry(path, runtime, Value::Null, DriftKind::Added)),
            (None, Some(disk)) => drift.push(entry(path, Value::Null, disk, DriftKind::Removed)),
            (Some(Value::Object(runtime)), Some(Value::Object(disk))) => {
                let mut keys: Vec<String> = runtime.keys().cloned().collect();
                for key in disk.keys() {
                    if !keys.iter().any(|k| k.eq_ignore_ascii_case(key)) {
                        keys.push(key.clone());
                    }
                }
                for key in keys {
                    let child = format!("{path}.{key}");
                    self.compare(&child, runtime.try_get(&key), disk.try_get(&key), drift);
                }
            }
            (Some(runtime), Some(disk)) => {
                if runtime != disk {
                    debug!(path, "value modified");
                    drift.push(entry(path, runtime, disk, DriftKind::Modified));
                }
            }
        }
    }

    fn is_ignored(&self, path: &str) -> bool {
        let segments: Vec<String> = split_path(path)
            .into_iter()
            .map(str::to_ascii_lowercase)
            .collect();
        self.ignored.iter().any(|pattern| {
            pattern.len() <= segments.len()
                && pattern
                    .iter()
                    .zip(&segments)
                    .all(|(p, s)| p == "*" || p == s)
        })
    }
}

/// Null and empty tables count as absent.
fn present(value: Option<Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) if map.is_empty() => None,
        other => other,
    }
}

fn entry(path: &str, runtime_value: Value, disk_value: Value, kind: DriftKind) -> ConfigDrift {
    ConfigDrift {
        path: path.to_string(),
        runtime_value,
        disk_value,
        different: true,
        kind,
    }
}
