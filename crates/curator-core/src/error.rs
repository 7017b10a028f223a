//! Core error types for the Curator application.
//!
//! Operations that cannot proceed return a [`CuratorError`]. Findings of an
//! operation that did proceed (validation issues, drift entries) are plain
//! data and never travel through this type.

use std::fmt;
use thiserror::Error;

/// Central error type for all Curator operations.
#[derive(Error, Debug)]
pub enum CuratorError {
    /// Configuration errors (missing, unreadable or unparseable data sources)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (empty or invalid arguments, missing builder inputs)
    #[error("validation error: {0}")]
    Validation(String),

    /// A mutating builder call arrived after `build()` sealed the builder
    #[error("builder is sealed: `{operation}` cannot be called after build")]
    Sealed {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// Storage errors (directory creation and similar filesystem failures)
    #[error("storage error at {path}: {source}")]
    Storage {
        /// Path that could not be prepared
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Secret store errors
    #[error("secret store error: {0}")]
    Secrets(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CuratorError {
    /// Classify this error into the coarse error taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Secrets(_) => ErrorKind::Configuration,
            Self::Validation(_) | Self::Sealed { .. } => ErrorKind::Validation,
            Self::Storage { .. } | Self::Io(_) => ErrorKind::Storage,
        }
    }

    /// Whether this error was raised because the builder is sealed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        matches!(self, Self::Sealed { .. })
    }
}

/// Coarse classification of [`CuratorError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing, unreadable or unparseable data source
    Configuration,
    /// Empty or invalid argument, builder-state violation
    Validation,
    /// Filesystem preparation failure
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::Validation => "validation",
            Self::Storage => "storage",
        };
        f.write_str(name)
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Data source not found
    #[error("data source not found at {path}")]
    NotFound {
        /// Path where the data source was expected
        path: String,
    },

    /// Data source exists but could not be read
    #[error("failed to read data source {path}: {source}")]
    Unreadable {
        /// Path of the data source
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Data source contents are not valid
    #[error("failed to parse data source {path}: {reason}")]
    Parse {
        /// Path of the data source
        path: String,
        /// Parser message
        reason: String,
    },

    /// Data source has an extension no reader understands
    #[error("unsupported data source format: {path}")]
    UnsupportedFormat {
        /// Path of the data source
        path: String,
    },

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

impl ConfigError {
    /// Path of the data source involved, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::NotFound { path }
            | Self::Unreadable { path, .. }
            | Self::Parse { path, .. }
            | Self::UnsupportedFormat { path } => Some(path),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Result type alias using `CuratorError`.
pub type Result<T> = std::result::Result<T, CuratorError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
