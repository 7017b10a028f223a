//! Data-source readers and the filesystem probe.
//!
//! Both are injected into the builder, validator and drift detector so tests
//! and alternative front ends can substitute their own implementations.

use curator_core::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads one on-disk structured data source into nested key-value data.
pub trait StructuredDataReader {
    /// Load the data source at `path`.
    ///
    /// # Errors
    /// - [`ConfigError::NotFound`] if nothing exists at `path`
    /// - [`ConfigError::Unreadable`] if it cannot be read
    /// - [`ConfigError::Parse`] if the contents are not a valid table
    fn load(&self, path: &Path) -> ConfigResult<Map<String, Value>>;
}

/// Default reader: TOML or JSON, selected by file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredFileReader;

impl StructuredDataReader for StructuredFileReader {
    fn load(&self, path: &Path) -> ConfigResult<Map<String, Value>> {
        let shown = path.display().to_string();

        if !path.is_file() {
            return Err(ConfigError::NotFound { path: shown });
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: shown.clone(),
            source,
        })?;

        debug!(path = %shown, "loading data source");

        match extension.as_deref() {
            Some("toml") => parse_toml(&contents, &shown),
            Some("json") => parse_json(&contents, &shown),
            _ => Err(ConfigError::UnsupportedFormat { path: shown }),
        }
    }
}

/// Parse TOML text into a key-value map.
pub fn parse_toml(contents: &str, origin: &str) -> ConfigResult<Map<String, Value>> {
    let table: toml::Table = toml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        reason: e.message().to_string(),
    })?;

    match serde_json::to_value(table) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConfigError::Parse {
            path: origin.to_string(),
            reason: "top level is not a table".to_string(),
        }),
        Err(e) => Err(ConfigError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Parse JSON text into a key-value map. The top level must be an object.
pub fn parse_json(contents: &str, origin: &str) -> ConfigResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConfigError::Parse {
            path: origin.to_string(),
            reason: "top level is not an object".to_string(),
        }),
        Err(e) => Err(ConfigError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Filesystem existence checks and directory creation.
pub trait FilesystemProbe {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents.
    fn create_directory(&self, path: &Path) -> std::io::Result<()>;
}

/// [`FilesystemProbe`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl FilesystemProbe for StdFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_directory(&self, path: &Path) -> std::io::Result<()> {
        fs::create_dir_all(path)
    }
}
