//! The aggregate configuration model.

use crate::paths::PathLayout;
use crate::secrets::SecretsHandle;
use curator_core::{reflect_members, PropertyBag};
use curator_storage::StorageGroup;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Subsystem key for storage problems in [`ConfigurationModel::errors`].
pub const STORAGE_SUBSYSTEM: &str = "Storage";

/// Runtime configuration of the application.
///
/// Produced by [`ConfigurationBuilder::build`](crate::ConfigurationBuilder::build)
/// and treated as immutable from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationModel {
    /// Short internal name, used for file and directory names
    pub internal_name: String,
    /// Human-readable application name
    pub display_name: String,
    /// Semantic application version
    pub version: String,
    /// Parsed runtime flags
    pub parameters: RuntimeParameters,
    /// Filesystem layout
    pub paths: PathLayout,
    /// Secret vault handle
    pub secrets: SecretsHandle,
    /// Logging settings
    pub logging: LoggingSettings,
    /// Storage groups by group id
    pub storage: BTreeMap<String, StorageGroup>,
    /// External tool requirements
    pub requirements: Map<String, Value>,
    /// UI settings
    pub ui: Map<String, Value>,
    /// Project settings
    pub project: PropertyBag,
    /// Error messages by subsystem
    pub errors: BTreeMap<String, String>,
}

impl Default for ConfigurationModel {
    fn default() -> Self {
        Self {
            internal_name: "curator".to_string(),
            display_name: "Curator".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            parameters: RuntimeParameters::default(),
            paths: PathLayout::default(),
            secrets: SecretsHandle::default(),
            logging: LoggingSettings::default(),
            storage: BTreeMap::new(),
            requirements: Map::new(),
            ui: Map::new(),
            project: PropertyBag::new(),
            errors: BTreeMap::new(),
        }
    }
}

impl ConfigurationModel {
    /// Look up a storage group by id.
    #[must_use]
    pub fn storage_group(&self, id: &str) -> Option<&StorageGroup> {
        self.storage.get(id)
    }

    /// Groups whose master drive is assigned and available.
    pub fn valid_groups(&self) -> impl Iterator<Item = &StorageGroup> {
        self.storage.values().filter(|g| g.is_valid())
    }

    /// Recorded error message for a subsystem.
    #[must_use]
    pub fn error(&self, subsystem: &str) -> Option<&str> {
        self.errors.get(subsystem).map(String::as_str)
    }
}

/// Runtime flags parsed by the front end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RuntimeParameters {
    /// Most verbose diagnostics
    pub debug: bool,
    /// Verbose diagnostics
    pub verbose: bool,
    /// Development mode
    pub dev: bool,
    /// Check for tool updates
    pub update: bool,
    /// Never prompt
    pub non_interactive: bool,
}

impl RuntimeParameters {
    /// Logging threshold implied by the flags.
    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        if self.debug {
            LogLevel::Trace
        } else if self.verbose {
            LogLevel::Debug
        } else {
            LogLevel::default()
        }
    }
}

/// Logging verbosity threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Diagnostics
    Debug,
    /// Normal operation
    #[default]
    Info,
    /// Recoverable problems
    Warn,
    /// Failures only
    Error,
}

impl LogLevel {
    /// Filter directive for `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Verbosity threshold
    pub level: LogLevel,
    /// Also log to the console
    pub console: bool,
    /// Log directory (defaults to the layout's log directory)
    pub directory: PathBuf,
    /// Log file name
    pub file_name: String,
    /// Rotate after this many megabytes
    pub max_file_size_mb: u32,
    /// Number of rotated files to keep
    pub retain_files: u32,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            console: true,
            directory: PathBuf::new(),
            file_name: "curator.log".to_string(),
            max_file_size_mb: 10,
            retain_files: 5,
        }
    }
}

impl LoggingSettings {
    /// Full path of the log file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

reflect_members!(ConfigurationModel {
    parameters,
    paths,
    secrets,
    logging,
});
reflect_members!(RuntimeParameters, LoggingSettings);
