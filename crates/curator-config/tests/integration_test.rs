use curator_config::{
    volume_root, Collaborators, ConfigSchema, ConfigurationBuilder, ConfigurationModel,
    DriftDetector, DriftKind, FilesystemProbe, IssueCategory, LogLevel, RuntimeParameters,
    SchemaValidator, Severity, StructuredFileReader, ValueKind,
};
use curator_core::MemberAccess;
use curator_storage::{LiveDrive, StaticDrives};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SETTINGS: &str = r#"
display_name = "Media Curator"

[ui]
width = 120

[logging]
level = "warn"
colour = true

[storage.1]
name = "Photos"

[storage.1.master]
label = "Photos"
serial_number = "S-1"

[storage.1.backup.1]
label = "Copy 1"
serial_number = "B-1"

[storage.1.backup.2]
label = "Copy 2"
serial_number = "B-2"

[storage.1.backup.notanumber]
label = "Ignored"
serial_number = "X-1"
"#;

struct FixedProbe(HashSet<PathBuf>);

impl FilesystemProbe for FixedProbe {
    fn exists(&self, path: &Path) -> bool {
        self.0.contains(path)
    }

    fn create_directory(&self, _path: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

fn write_settings(dir: &Path) -> PathBuf {
    let path = dir.join("curator.toml");
    fs::write(&path, SETTINGS).expect("write settings");
    path
}

fn builder_with_drives(drives: Vec<LiveDrive>) -> ConfigurationBuilder {
    ConfigurationBuilder::new(Collaborators::system().with_devices(StaticDrives::new(drives)))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

fn sealed<T>(result: curator_core::Result<T>) -> bool {
    matches!(result, Err(e) if e.is_sealed())
}

#[test]
fn test_root_path_derivation_is_deterministic() {
    let tmp = TempDir::new().expect("create temp dir");
    let hint = tmp.path().join("ext1");
    fs::create_dir_all(hint.join("src")).expect("create source marker");

    let first = builder_with_drives(Vec::new())
        .with_root_path(&hint)
        .expect("root path")
        .model()
        .paths
        .clone();
    let second = builder_with_drives(Vec::new())
        .with_root_path(&hint)
        .expect("root path")
        .model()
        .paths
        .clone();

    assert_eq!(first, second);
    assert_eq!(first.repository_root, hint);
    assert_eq!(first.root, volume_root(&hint));
}

#[test]
fn test_media_hint_with_source_marker() {
    let probe = FixedProbe([PathBuf::from("/media/ext1/src")].into_iter().collect());
    let collaborators = Collaborators {
        filesystem: Box::new(probe),
        ..Collaborators::system()
    };
    let mut builder = ConfigurationBuilder::new(collaborators);
    builder.with_root_path("/media/ext1").expect("root path");

    assert_eq!(
        builder.model().paths.repository_root,
        PathBuf::from("/media/ext1")
    );
    assert_eq!(builder.model().paths.root, PathBuf::from("/media"));
}

#[test]
fn test_every_mutator_fails_after_build() {
    let tmp = TempDir::new().expect("create temp dir");
    let settings = write_settings(tmp.path());

    let mut builder = builder_with_drives(Vec::new());
    builder
        .with_root_path(tmp.path())
        .expect("root path")
        .with_parameters(RuntimeParameters::default())
        .expect("parameters")
        .build()
        .expect("build");

    assert!(sealed(builder.with_repository_marker("src")));
    assert!(sealed(builder.with_names("curator", "Curator")));
    assert!(sealed(builder.with_root_path(tmp.path())));
    assert!(sealed(builder.with_roots(tmp.path(), None)));
    assert!(sealed(builder.with_parameters(RuntimeParameters::default())));
    assert!(sealed(builder.with_version("1.0.0")));
    assert!(sealed(builder.load_configuration_data_source(&settings)));
    assert!(sealed(builder.load_requirements_data_source(&settings)));
    assert!(sealed(builder.initialize_directories()));
    assert!(sealed(builder.load_secrets()));
    assert!(sealed(builder.update_storage_status()));
    assert!(sealed(builder.build()));
}

#[test]
fn test_serial_reconciliation_sets_mount_path() {
    let tmp = TempDir::new().expect("create temp dir");
    let settings = write_settings(tmp.path());

    let mut builder = builder_with_drives(vec![
        LiveDrive::new("Photos", "S-1", "/mnt/photos"),
        LiveDrive::new("Unrelated", "Z-9", "/mnt/other"),
    ]);
    builder
        .load_configuration_data_source(&settings)
        .expect("configuration")
        .update_storage_status()
        .expect("storage status");

    let group = builder.model().storage_group("1").expect("group 1");
    let master = group.master.as_ref().expect("master");
    assert_eq!(master.mount_path, "/mnt/photos");
    assert!(master.available);
    assert!(!group.backup[&1].available);
    assert_eq!(group.backup[&1].mount_path, "");
}

#[test]
fn test_unmatched_drive_keeps_mount_path() {
    let tmp = TempDir::new().expect("create temp dir");
    let settings = write_settings(tmp.path());

    let mut builder = builder_with_drives(vec![LiveDrive::new("Photos", "S-1", "/mnt/photos")]);
    builder
        .load_configuration_data_source(&settings)
        .expect("configuration")
        .update_storage_status()
        .expect("first pass");
    let mut model = builder.model().clone();

    // The drive has since been unplugged.
    curator_storage::reconcile(&mut model.storage, &StaticDrives::empty()).expect("second pass");

    let master = model.storage["1"].master.as_ref().expect("master");
    assert!(!master.available);
    assert_eq!(master.mount_path, "/mnt/photos");
}

#[test]
fn test_backup_keys_must_be_numeric() {
    let tmp = TempDir::new().expect("create temp dir");
    let settings = write_settings(tmp.path());

    let mut builder = builder_with_drives(Vec::new());
    builder
        .load_configuration_data_source(&settings)
        .expect("configuration");

    let group = builder.model().storage_group("1").expect("group 1");
    assert_eq!(group.backup.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_required_and_optional_schema_on_missing_path() {
    let model = ConfigurationModel::default();

    let mut required = SchemaValidator::new(None);
    required.register(ConfigSchema::new("project.owner", ValueKind::String).required());
    let issues: Vec<_> = required
        .validate_configuration(&model)
        .iter()
        .filter(|i| i.path == "project.owner")
        .cloned()
        .collect();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::Error);
    assert_eq!(issues[0].category, IssueCategory::Schema);

    let mut optional = SchemaValidator::new(None);
    optional.register(ConfigSchema::new("project.owner", ValueKind::String));
    assert!(optional
        .validate_configuration(&model)
        .iter()
        .all(|i| i.path != "project.owner"));
}

#[test]
fn test_ui_width_range_boundaries() {
    let cases = [(79, 1), (80, 0), (300, 0), (301, 1)];
    for (width, expected) in cases {
        let mut model = ConfigurationModel::default();
        model.ui.insert("width".to_string(), json!(width));

        let mut validator = SchemaValidator::new(None);
        validator.register(ConfigSchema::new("ui.width", ValueKind::Int).range(80.0, 300.0));
        validator.validate_configuration(&model);

        let range_errors = validator
            .issues_by_severity(Severity::Error)
            .filter(|i| i.category == IssueCategory::Range)
            .count();
        assert_eq!(range_errors, expected, "width {width}");
    }
}

#[test]
fn test_built_model_passes_default_validation() {
    let tmp = TempDir::new().expect("create temp dir");
    let settings = write_settings(tmp.path());

    let mut builder = builder_with_drives(vec![LiveDrive::new("Photos", "S-1", "/mnt/photos")]);
    let model = builder
        .with_root_path(tmp.path())
        .expect("root path")
        .with_parameters(RuntimeParameters::default())
        .expect("parameters")
        .load_configuration_data_source(&settings)
        .expect("configuration")
        .initialize_directories()
        .expect("directories")
        .load_secrets()
        .expect("secrets")
        .update_storage_status()
        .expect("storage status")
        .build()
        .expect("build");

    assert!(model.paths.app.vault.is_dir());

    let mut validator = SchemaValidator::with_defaults(None);
    validator.validate_configuration(&model);
    assert!(!validator.has_errors(), "issues: {:?}", validator.issues());

    // The vault database does not exist on first run.
    assert!(validator
        .issues()
        .iter()
        .any(|i| i.category == IssueCategory::Security && i.path == "secrets.database_path"));
}

#[test]
fn test_drift_symmetry() {
    let detector = DriftDetector::new(Box::new(StructuredFileReader));
    let base = json!({
        "ui": { "width": 120, "theme": "dark" },
        "logging": { "level": "info" }
    });

    let same = detector.detect_between(&object(base.clone()), &object(base.clone()));
    assert!(same.is_empty());

    let mut changed = base.clone();
    changed["ui"]["width"] = json!(140);
    let drift = detector.detect_between(&object(changed), &object(base.clone()));
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].path, "ui.width");
    assert_eq!(drift[0].kind, DriftKind::Modified);
    assert!(drift[0].different);

    let mut runtime_missing = object(base.clone());
    runtime_missing.remove("logging");
    let drift = detector.detect_between(&runtime_missing, &object(base.clone()));
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].kind, DriftKind::Removed);
    assert_eq!(drift[0].path, "logging");

    let mut disk_missing = object(base.clone());
    disk_missing.remove("logging");
    let drift = detector.detect_between(&object(base), &disk_missing);
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].kind, DriftKind::Added);
}

#[test]
fn test_typed_model_drift_against_saved_file() {
    let tmp = TempDir::new().expect("create temp dir");
    let mut model = ConfigurationModel::default();
    model.ui.insert("width".to_string(), json!(120));

    let saved = tmp.path().join("saved.json");
    let contents = serde_json::to_string_pretty(&model).expect("serialize model");
    fs::write(&saved, contents).expect("write saved model");

    let detector = DriftDetector::new(Box::new(StructuredFileReader));
    assert!(detector
        .detect_drift(&model, &saved)
        .expect("detect drift")
        .is_empty());

    assert!(model.set("display_name", json!("Renamed")));
    let drift = detector.detect_drift(&model, &saved).expect("detect drift");
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].path, "display_name");
    assert_eq!(drift[0].disk_value, json!("Curator"));
}

#[test]
fn test_runtime_only_paths_hide_derived_members() {
    let tmp = TempDir::new().expect("create temp dir");
    let settings = write_settings(tmp.path());

    let mut builder = builder_with_drives(vec![LiveDrive::new("Photos", "S-1", "/mnt/photos")]);
    let model = builder
        .with_root_path(tmp.path())
        .expect("root path")
        .with_parameters(RuntimeParameters::default())
        .expect("parameters")
        .load_configuration_data_source(&settings)
        .expect("configuration")
        .update_storage_status()
        .expect("storage status")
        .build()
        .expect("build");

    let detector = DriftDetector::new(Box::new(StructuredFileReader))
        .with_ignored_paths(DriftDetector::RUNTIME_ONLY_PATHS);
    let drift = detector.detect_drift(&model, &settings).expect("detect drift");

    assert!(drift.iter().all(|d| !d.path.ends_with("mount_path")));
    assert!(drift.iter().all(|d| !d.path.starts_with("paths")));
    assert!(drift
        .iter()
        .any(|d| d.path == "storage.1.backup.notanumber" && d.kind == DriftKind::Removed));
    assert!(drift
        .iter()
        .all(|d| d.path != "logging.colour" && d.path != "logging.level"));
}

#[test]
fn test_settings_file_log_level_is_kept_after_parameters() {
    let tmp = TempDir::new().expect("create temp dir");
    let settings = write_settings(tmp.path());

    let mut builder = builder_with_drives(Vec::new());
    builder
        .load_configuration_data_source(&settings)
        .expect("configuration")
        .with_parameters(RuntimeParameters::default())
        .expect("parameters");
    assert_eq!(builder.model().logging.level, LogLevel::Warn);
}
