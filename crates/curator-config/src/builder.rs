//! Staged, single-use assembly of the [`ConfigurationModel`].
//!
//! Each stage takes `&mut self` and returns the builder again so calls can
//! be chained with `?`. Once [`ConfigurationBuilder::build`] succeeds the
//! builder is sealed and every further call fails with
//! [`CuratorError::Sealed`].

use crate::model::{ConfigurationModel, LogLevel, RuntimeParameters, STORAGE_SUBSYSTEM};
use crate::paths::{PathLayout, DEFAULT_REPOSITORY_MARKER};
use crate::secrets::{SecretStore, VaultDirectoryStore};
use crate::source::{FilesystemProbe, StdFilesystem, StructuredDataReader, StructuredFileReader};
use curator_core::{CuratorError, MemberAccess, Result};
use curator_storage::{reconcile, LiveDeviceProvider, StaticDrives, StorageGroup};
use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// External collaborators injected into the builder.
pub struct Collaborators {
    /// Reads on-disk data sources
    pub reader: Box<dyn StructuredDataReader>,
    /// Checks and creates directories
    pub filesystem: Box<dyn FilesystemProbe>,
    /// Enumerates attached storage devices
    pub devices: Box<dyn LiveDeviceProvider>,
    /// Lists the secrets held by the vault
    pub secrets: Box<dyn SecretStore>,
}

impl Collaborators {
    /// Default collaborators backed by the local filesystem.
    ///
    /// No device enumeration backend is wired, so every configured drive
    /// reconciles as unavailable until a real provider is supplied.
    #[must_use]
    pub fn system() -> Self {
        Self {
            reader: Box::new(StructuredFileReader),
            filesystem: Box::new(StdFilesystem),
            devices: Box::new(StaticDrives::empty()),
            secrets: Box::new(VaultDirectoryStore),
        }
    }

    /// Replace the live-device provider.
    #[must_use]
    pub fn with_devices(mut self, devices: impl LiveDeviceProvider + 'static) -> Self {
        self.devices = Box::new(devices);
        self
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::system()
    }
}

/// Assembles a [`ConfigurationModel`] from a root hint, runtime parameters
/// and on-disk data sources.
pub struct ConfigurationBuilder {
    collaborators: Collaborators,
    model: ConfigurationModel,
    repository_marker: String,
    file_log_level: Option<LogLevel>,
    paths_set: bool,
    parameters_set: bool,
    sealed: bool,
}

impl ConfigurationBuilder {
    /// Create a builder around the given collaborators.
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            model: ConfigurationModel::default(),
            repository_marker: DEFAULT_REPOSITORY_MARKER.to_string(),
            file_log_level: None,
            paths_set: false,
            parameters_set: false,
            sealed: false,
        }
    }

    /// Whether `build()` has completed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// The model assembled so far.
    #[must_use]
    pub fn model(&self) -> &ConfigurationModel {
        &self.model
    }

    fn ensure_unsealed(&self, operation: &'static str) -> Result<()> {
        if self.sealed {
            warn!(operation, "rejected call on sealed configuration builder");
            return Err(CuratorError::Sealed { operation });
        }
        Ok(())
    }

    /// Name of the subdirectory that identifies a source checkout.
    pub fn with_repository_marker(&mut self, marker: impl Into<String>) -> Result<&mut Self> {
        self.ensure_unsealed("with_repository_marker")?;
        let marker = marker.into();
        if marker.trim().is_empty() {
            return Err(CuratorError::Validation(
                "repository marker must not be empty".to_string(),
            ));
        }
        self.repository_marker = marker;
        Ok(self)
    }

    /// Set the internal and display names.
    pub fn with_names(
        &mut self,
        internal_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<&mut Self> {
        self.ensure_unsealed("with_names")?;
        let internal_name = internal_name.into();
        let display_name = display_name.into();
        if internal_name.trim().is_empty() || display_name.trim().is_empty() {
            return Err(CuratorError::Validation(
                "application names must not be empty".to_string(),
            ));
        }
        self.model.internal_name = internal_name;
        self.model.display_name = display_name;
        Ok(self)
    }

    /// Resolve the path layout from a single root hint.
    ///
    /// If `hint/<marker>` exists the hint is the repository root and its
    /// volume root is the runtime root; otherwise both roots are the hint.
    /// A relative hint is resolved against the current directory.
    pub fn with_root_path(&mut self, hint: impl AsRef<Path>) -> Result<&mut Self> {
        self.ensure_unsealed("with_root_path")?;
        let hint = hint.as_ref();
        if hint.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(CuratorError::Validation(
                "root path must not be empty".to_string(),
            ));
        }

        let hint = if hint.is_absolute() {
            hint.to_path_buf()
        } else {
            std::env::current_dir()?.join(hint)
        };

        let layout = PathLayout::from_hint(
            &hint,
            &self.repository_marker,
            self.collaborators.filesystem.as_ref(),
        );
        info!(
            root = %layout.root.display(),
            repository = %layout.repository_root.display(),
            "resolved path layout"
        );
        self.model.paths = layout;
        self.paths_set = true;
        Ok(self)
    }

    /// Set the runtime and repository roots explicitly.
    ///
    /// Without a repository root, `root/<internal_name>` is used when it
    /// exists, otherwise `root` itself.
    pub fn with_roots(
        &mut self,
        root: impl AsRef<Path>,
        repository_root: Option<&Path>,
    ) -> Result<&mut Self> {
        self.ensure_unsealed("with_roots")?;
        let root = root.as_ref();
        if !root.is_absolute() || repository_root.is_some_and(|r| !r.is_absolute()) {
            return Err(CuratorError::Validation(
                "runtime and repository roots must be absolute".to_string(),
            ));
        }

        self.model.paths = PathLayout::derive(
            root,
            repository_root,
            &self.model.internal_name,
            self.collaborators.filesystem.as_ref(),
        );
        self.paths_set = true;
        Ok(self)
    }

    /// Attach runtime flags and derive the logging threshold.
    ///
    /// `--debug` and `--verbose` win over a level loaded from the settings
    /// file, which in turn wins over the default, whatever the call order.
    pub fn with_parameters(&mut self, parameters: RuntimeParameters) -> Result<&mut Self> {
        self.ensure_unsealed("with_parameters")?;
        self.model.parameters = parameters;
        self.apply_log_level();
        self.parameters_set = true;
        debug!(level = %self.model.logging.level, "applied runtime parameters");
        Ok(self)
    }

    /// Record the semantic application version.
    pub fn with_version(&mut self, version: impl Into<String>) -> Result<&mut Self> {
        self.ensure_unsealed("with_version")?;
        static SEMVER_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = SEMVER_REGEX.get_or_init(|| {
            Regex::new(r"^v?\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.-]+)?$").expect("valid regex")
        });

        let version = version.into();
        if !regex.is_match(&version) {
            return Err(CuratorError::Validation(format!(
                "invalid semantic version: {version:?}"
            )));
        }
        self.model.version = version;
        Ok(self)
    }

    /// Load the application settings data source and merge its sections.
    ///
    /// Nothing is merged when loading fails.
    pub fn load_configuration_data_source(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        self.ensure_unsealed("load_configuration_data_source")?;
        let path = path.as_ref();
        let data = self.collaborators.reader.load(path)?;
        self.merge_configuration(&data);
        info!(path = %path.display(), sections = data.len(), "merged configuration data source");
        Ok(self)
    }

    /// Load the requirements data source wholesale.
    pub fn load_requirements_data_source(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        self.ensure_unsealed("load_requirements_data_source")?;
        let path = path.as_ref();
        let data = self.collaborators.reader.load(path)?;
        info!(path = %path.display(), entries = data.len(), "loaded requirements");
        self.model.requirements = data;
        Ok(self)
    }

    /// Create every directory of the path layout that does not exist yet.
    pub fn initialize_directories(&mut self) -> Result<&mut Self> {
        self.ensure_unsealed("initialize_directories")?;
        self.require_paths("initialize_directories")?;

        let probe = self.collaborators.filesystem.as_ref();
        for dir in self.model.paths.directories() {
            if probe.exists(dir) {
                continue;
            }
            probe
                .create_directory(dir)
                .map_err(|source| CuratorError::Storage {
                    path: dir.display().to_string(),
                    source,
                })?;
            debug!(path = %dir.display(), "created directory");
        }
        Ok(self)
    }

    /// Attach the secrets handle to the vault and load the secret index.
    pub fn load_secrets(&mut self) -> Result<&mut Self> {
        self.ensure_unsealed("load_secrets")?;
        self.require_paths("load_secrets")?;

        if !self.model.secrets.is_attached() {
            let vault = self.model.paths.app.vault.clone();
            self.model.secrets.attach(vault);
        }
        self.model
            .secrets
            .populate(self.collaborators.secrets.as_ref())?;
        Ok(self)
    }

    /// Reconcile storage groups with the attached devices.
    ///
    /// Groups whose master is missing or unavailable are summarized in the
    /// error map under the `Storage` subsystem.
    pub fn update_storage_status(&mut self) -> Result<&mut Self> {
        self.ensure_unsealed("update_storage_status")?;
        let report = reconcile(&mut self.model.storage, self.collaborators.devices.as_ref())?;

        let problems: Vec<String> = self
            .model
            .storage
            .values()
            .filter(|group| !group.is_valid())
            .map(|group| {
                let reason = if group.master.is_some() {
                    "master drive is not available"
                } else {
                    "no master drive configured"
                };
                format!("group {} ({}): {reason}", group.id, group.name)
            })
            .collect();

        if problems.is_empty() {
            self.model.errors.remove(STORAGE_SUBSYSTEM);
        } else {
            warn!(
                invalid_groups = problems.len(),
                unmatched_drives = report.unmatched.len(),
                "storage groups are not ready"
            );
            self.model
                .errors
                .insert(STORAGE_SUBSYSTEM.to_string(), problems.join("; "));
        }
        Ok(self)
    }

    /// Finish assembly, seal the builder and return the model.
    ///
    /// Fails without sealing when the path layout or the runtime parameters
    /// are missing.
    pub fn build(&mut self) -> Result<ConfigurationModel> {
        self.ensure_unsealed("build")?;
        self.require_paths("build")?;
        if !self.parameters_set {
            return Err(CuratorError::Validation(
                "runtime parameters must be set before build".to_string(),
            ));
        }

        if self.model.logging.directory.as_os_str().is_empty() {
            self.model.logging.directory = self.model.paths.log.clone();
        }
        if !self.model.secrets.is_attached() {
            let vault = self.model.paths.app.vault.clone();
            self.model.secrets.attach(vault);
        }

        self.sealed = true;
        info!(
            name = %self.model.internal_name,
            version = %self.model.version,
            groups = self.model.storage.len(),
            "configuration built"
        );
        Ok(self.model.clone())
    }

    fn require_paths(&self, operation: &str) -> Result<()> {
        if self.paths_set {
            Ok(())
        } else {
            Err(CuratorError::Validation(format!(
                "path layout must be set before {operation}"
            )))
        }
    }

    fn apply_log_level(&mut self) {
        let parameters = self.model.parameters;
        self.model.logging.level = if parameters.debug || parameters.verbose {
            parameters.log_level()
        } else {
            self.file_log_level.unwrap_or_default()
        };
    }

    fn merge_configuration(&mut self, data: &Map<String, Value>) {
        if let Some(Value::String(name)) = data.try_get("internal_name") {
            self.model.internal_name = name;
        }
        if let Some(Value::String(name)) = data.try_get("display_name") {
            self.model.display_name = name;
        }

        if let Some(Value::Object(groups)) = data.try_get("storage") {
            for (id, section) in &groups {
                if section.is_object() {
                    let group = StorageGroup::from_config(id, section);
                    debug!(group = %id, backups = group.backup.len(), "loaded storage group");
                    self.model.storage.insert(id.clone(), group);
                } else {
                    warn!(group = %id, "storage group is not a table; skipped");
                }
            }
        }

        if let Some(Value::Object(ui)) = data.try_get("ui") {
            for (key, value) in ui {
                self.model.ui.insert(key, value);
            }
        }

        if let Some(Value::Object(logging)) = data.try_get("logging") {
            for (key, value) in logging {
                if !self.model.logging.set(&key, value) {
                    debug!(key = %key, "ignoring unknown or invalid logging setting");
                } else if key.trim().eq_ignore_ascii_case("level") {
                    self.file_log_level = Some(self.model.logging.level);
                }
            }
            self.apply_log_level();
        }

        if let Some(Value::Object(project)) = data.try_get("project") {
            for (key, value) in project {
                self.model.project.insert(key, value);
            }
        }

        if let Some(Value::Object(secrets)) = data.try_get("secrets") {
            let mut moved = 0usize;
            for (key, value) in secrets {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                self.model.secrets.legacy.insert(key, text);
                moved += 1;
            }
            if moved > 0 {
                warn!(count = moved, "configuration contains plaintext secrets");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogLevel;
    use curator_core::{ConfigError, ConfigResult, ErrorKind};
    use curator_storage::LiveDrive;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;
    use std::rc::Rc;

    #[derive(Default)]
    struct MemoryReader(HashMap<PathBuf, Map<String, Value>>);

    impl MemoryReader {
        fn with(mut self, path: &str, data: Value) -> Self {
            if let Value::Object(map) = data {
                self.0.insert(PathBuf::from(path), map);
            }
            self
        }
    }

    impl StructuredDataReader for MemoryReader {
        fn load(&self, path: &Path) -> ConfigResult<Map<String, Value>> {
            self.0.get(path).cloned().ok_or_else(|| ConfigError::NotFound {
                path: path.display().to_string(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct MemoryFs {
        existing: Rc<RefCell<HashSet<PathBuf>>>,
        read_only: bool,
    }

    impl MemoryFs {
        fn with(paths: &[&str]) -> Self {
            let fs = Self::default();
            fs.existing
                .borrow_mut()
                .extend(paths.iter().map(PathBuf::from));
            fs
        }
    }

    impl FilesystemProbe for MemoryFs {
        fn exists(&self, path: &Path) -> bool {
            self.existing.borrow().contains(path)
        }

        fn create_directory(&self, path: &Path) -> std::io::Result<()> {
            if self.read_only {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only filesystem",
                ));
            }
            self.existing.borrow_mut().insert(path.to_path_buf());
            Ok(())
        }
    }

    struct OneSecret;

    impl SecretStore for OneSecret {
        fn secret_names(&self, _vault_path: &Path) -> Result<Vec<String>> {
            Ok(vec!["tmdb_api_key".to_string()])
        }
    }

    fn collaborators(reader: MemoryReader, fs: MemoryFs, live: Vec<LiveDrive>) -> Collaborators {
        Collaborators {
            reader: Box::new(reader),
            filesystem: Box::new(fs),
            devices: Box::new(StaticDrives::new(live)),
            secrets: Box::new(OneSecret),
        }
    }

    fn settings() -> Value {
        json!({
            "display_name": "Media Curator",
            "ui": { "width": 120, "theme": "dark" },
            "logging": { "level": "warn", "retain_files": 3, "colour": true },
            "project": { "default": "Holiday" },
            "storage": {
                "1": {
                    "name": "Photos",
                    "master": { "label": "Photos", "serial_number": "S-1" },
                    "backup": {
                        "1": { "label": "Copy 1", "serial_number": "B-1" },
                        "2": { "label": "Copy 2", "serial_number": "B-2" },
                        "notanumber": { "label": "Ignored", "serial_number": "X" }
                    }
                }
            }
        })
    }

    #[test]
    fn test_full_assembly() {
        let reader = MemoryReader::default()
            .with("/media/ext1/config/curator.toml", settings())
            .with("/media/ext1/config/requirements.json", json!({ "ffmpeg": "6.1" }));
        let fs = MemoryFs::with(&["/media/ext1/src"]);
        let live = vec![LiveDrive::new("Photos", "S-1", "/mnt/photos")];
        let mut builder = ConfigurationBuilder::new(collaborators(reader, fs, live));

        let model = builder
            .with_root_path("/media/ext1")
            .expect("root path")
            .with_parameters(RuntimeParameters::default())
            .expect("parameters")
            .with_version("v1.4.0")
            .expect("version")
            .load_configuration_data_source("/media/ext1/config/curator.toml")
            .expect("configuration")
            .load_requirements_data_source("/media/ext1/config/requirements.json")
            .expect("requirements")
            .initialize_directories()
            .expect("directories")
            .load_secrets()
            .expect("secrets")
            .update_storage_status()
            .expect("storage status")
            .build()
            .expect("build");

        assert_eq!(model.paths.root, PathBuf::from("/media"));
        assert_eq!(model.display_name, "Media Curator");
        assert_eq!(model.version, "v1.4.0");
        assert_eq!(model.ui["width"], json!(120));
        assert_eq!(model.logging.level, LogLevel::Warn);
        assert_eq!(model.logging.retain_files, 3);
        assert_eq!(model.logging.directory, PathBuf::from("/media/ext1/logs"));
        assert_eq!(model.requirements["ffmpeg"], json!("6.1"));
        assert!(model.secrets.contains("tmdb_api_key"));

        let group = model.storage_group("1").expect("group 1");
        assert_eq!(group.backup.len(), 2);
        assert_eq!(
            group.master.as_ref().expect("master").mount_path,
            "/mnt/photos"
        );
        assert!(model.error(STORAGE_SUBSYSTEM).is_none());
        assert_eq!(model.valid_groups().count(), 1);
        assert!(builder.is_sealed());
    }

    #[test]
    fn test_empty_root_hint_is_validation_error() {
        let mut builder = ConfigurationBuilder::new(collaborators(
            MemoryReader::default(),
            MemoryFs::default(),
            Vec::new(),
        ));
        let err = builder.with_root_path("  ").err().expect("empty hint rejected");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_missing_data_source_leaves_model_untouched() {
        let mut builder = ConfigurationBuilder::new(collaborators(
            MemoryReader::default(),
            MemoryFs::default(),
            Vec::new(),
        ));
        let before = builder.model().clone();
        let err = builder
            .load_configuration_data_source("/nowhere/curator.toml")
            .err()
            .expect("missing file rejected");

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("/nowhere/curator.toml"));
        assert_eq!(builder.model(), &before);
    }

    #[test]
    fn test_build_requires_paths_and_parameters() {
        let mut builder = ConfigurationBuilder::new(collaborators(
            MemoryReader::default(),
            MemoryFs::default(),
            Vec::new(),
        ));
        assert!(builder.build().is_err());
        assert!(!builder.is_sealed());

        builder.with_root_path("/srv/curator").expect("root path");
        let err = builder.build().err().expect("parameters missing");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!builder.is_sealed());

        builder
            .with_parameters(RuntimeParameters::default())
            .expect("parameters");
        builder.build().expect("build after fixing inputs");
        assert!(builder.is_sealed());
    }

    #[test]
    fn test_parameters_set_log_level() {
        let mut builder = ConfigurationBuilder::new(collaborators(
            MemoryReader::default().with("/c.toml", json!({ "logging": { "level": "error" } })),
            MemoryFs::default(),
            Vec::new(),
        ));
        builder
            .with_parameters(RuntimeParameters {
                verbose: true,
                ..RuntimeParameters::default()
            })
            .expect("parameters");
        assert_eq!(builder.model().logging.level, LogLevel::Debug);

        builder
            .load_configuration_data_source("/c.toml")
            .expect("configuration");
        assert_eq!(builder.model().logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_file_log_level_survives_later_parameters() {
        let mut builder = ConfigurationBuilder::new(collaborators(
            MemoryReader::default().with("/c.toml", json!({ "logging": { "level": "warn" } })),
            MemoryFs::default(),
            Vec::new(),
        ));
        builder
            .load_configuration_data_source("/c.toml")
            .expect("configuration")
            .with_parameters(RuntimeParameters::default())
            .expect("parameters");
        assert_eq!(builder.model().logging.level, LogLevel::Warn);

        builder
            .with_parameters(RuntimeParameters {
                debug: true,
                ..RuntimeParameters::default()
            })
            .expect("debug parameters");
        assert_eq!(builder.model().logging.level, LogLevel::Trace);

        builder
            .with_parameters(RuntimeParameters::default())
            .expect("plain parameters");
        assert_eq!(builder.model().logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_version_rejected() {
        let mut builder = ConfigurationBuilder::new(collaborators(
            MemoryReader::default(),
            MemoryFs::default(),
            Vec::new(),
        ));
        assert!(builder.with_version("one").is_err());
        assert!(builder.with_version("").is_err());
        assert!(builder.with_version(" 1.0.0").is_err());
        assert!(builder.with_version("2.0.0-rc.1").is_ok());
        assert_eq!(builder.model().version, "2.0.0-rc.1");
    }

    #[test]
    fn test_directory_creation_failure_is_storage_error() {
        let fs = MemoryFs {
            read_only: true,
            ..MemoryFs::default()
        };
        let mut builder =
            ConfigurationBuilder::new(collaborators(MemoryReader::default(), fs, Vec::new()));
        builder.with_root_path("/srv/curator").expect("root path");

        let err = builder
            .initialize_directories()
            .err()
            .expect("creation fails");
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("/srv/curator/logs"));
    }

    #[test]
    fn test_initialize_directories_creates_layout() {
        let fs = MemoryFs::default();
        let existing = Rc::clone(&fs.existing);
        let mut builder =
            ConfigurationBuilder::new(collaborators(MemoryReader::default(), fs, Vec::new()));
        builder
            .with_root_path("/srv/curator")
            .expect("root path")
            .initialize_directories()
            .expect("directories");

        let created = existing.borrow();
        assert!(created.contains(Path::new("/srv/curator/vault")));
        assert!(created.contains(Path::new("/srv/curator/plugins/_temp")));
    }

    #[test]
    fn test_unavailable_master_recorded_under_storage() {
        let mut builder = ConfigurationBuilder::new(collaborators(
            MemoryReader::default().with("/c.toml", settings()),
            MemoryFs::default(),
            Vec::new(),
        ));
        builder
            .load_configuration_data_source("/c.toml")
            .expect("configuration")
            .update_storage_status()
            .expect("storage status");

        let message = builder.model().error(STORAGE_SUBSYSTEM).expect("storage error");
        assert!(message.contains("group 1 (Photos)"));
    }

    #[test]
    fn test_legacy_secrets_moved_into_handle() {
        let mut builder = ConfigurationBuilder::new(collaborators(
            MemoryReader::default().with("/c.toml", json!({ "secrets": { "api_key": "hunter2" } })),
            MemoryFs::default(),
            Vec::new(),
        ));
        builder
            .load_configuration_data_source("/c.toml")
            .expect("configuration");
        assert_eq!(
            builder.model().secrets.legacy.get("api_key").map(String::as_str),
            Some("hunter2")
        );
    }

    #[test]
    fn test_custom_repository_marker() {
        let fs = MemoryFs::with(&["/media/ext1/.git"]);
        let mut builder =
            ConfigurationBuilder::new(collaborators(MemoryReader::default(), fs, Vec::new()));
        builder
            .with_repository_marker(".git")
            .expect("marker")
            .with_root_path("/media/ext1")
            .expect("root path");
        assert_eq!(builder.model().paths.root, PathBuf::from("/media"));
        assert!(builder.with_repository_marker(" ").is_err());
    }

    #[test]
    fn test_with_roots_uses_internal_name_directory() {
        let fs = MemoryFs::with(&["/media/archive"]);
        let mut builder =
            ConfigurationBuilder::new(collaborators(MemoryReader::default(), fs, Vec::new()));
        builder
            .with_names("archive", "Archive")
            .expect("names")
            .with_roots("/media", None)
            .expect("roots");
        assert_eq!(
            builder.model().paths.repository_root,
            PathBuf::from("/media/archive")
        );
        assert!(builder.with_roots("relative", None).is_err());
    }
}
