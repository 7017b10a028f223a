//! Curator Config - assembly, validation and drift detection of the
//! runtime configuration.
//!
//! # Modules
//!
//! - [`paths`] - Filesystem layout derived from a root hint
//! - [`model`] - The aggregate [`ConfigurationModel`]
//! - [`secrets`] - Secrets handle and the secret store contract
//! - [`source`] - Data-source readers and the filesystem probe
//! - [`builder`] - Staged, single-use [`ConfigurationBuilder`]
//! - [`schema`] / [`validator`] - Declarative validation rules and the
//!   [`SchemaValidator`]
//! - [`drift`] - [`DriftDetector`] comparing memory against disk
//!
//! # Example
//!
//! ```rust,no_run
//! use curator_config::{Collaborators, ConfigurationBuilder, RuntimeParameters, SchemaValidator};
//!
//! # fn main() -> curator_core::Result<()> {
//! let mut builder = ConfigurationBuilder::new(Collaborators::system());
//! let model = builder
//!     .with_root_path("/media/ext1")?
//!     .with_parameters(RuntimeParameters::default())?
//!     .load_configuration_data_source("/media/ext1/config/curator.toml")?
//!     .update_storage_status()?
//!     .build()?;
//!
//! let mut validator = SchemaValidator::with_defaults(None);
//! validator.validate_configuration(&model);
//! if validator.has_errors() {
//!     eprintln!("configuration has errors");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod builder;
pub mod drift;
pub mod model;
pub mod paths;
pub mod schema;
pub mod secrets;
pub mod source;
pub mod validator;

// Re-export commonly used types
pub use builder::{Collaborators, ConfigurationBuilder};
pub use drift::{ConfigDrift, DriftDetector, DriftKind};
pub use model::{
    ConfigurationModel, LogLevel, LoggingSettings, RuntimeParameters, STORAGE_SUBSYSTEM,
};
pub use paths::{volume_root, AppPaths, PathLayout, PluginPaths, DEFAULT_REPOSITORY_MARKER};
pub use schema::{ConfigSchema, CustomCheck, ValueKind};
pub use secrets::{SecretStore, SecretsHandle, VaultDirectoryStore};
pub use source::{FilesystemProbe, StdFilesystem, StructuredDataReader, StructuredFileReader};
pub use validator::{default_schemas, IssueCategory, SchemaValidator, Severity, ValidationIssue};
