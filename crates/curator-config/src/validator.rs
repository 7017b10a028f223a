//! Schema-driven validation producing categorized issues.
//!
//! Validation never fails: every problem found is returned as a
//! [`ValidationIssue`]. The validator works over any [`MemberAccess`]
//! container, so the typed model and freshly parsed maps are checked the
//! same way.

use crate::schema::{type_name, ConfigSchema, ValueKind};
use crate::source::FilesystemProbe;
use curator_core::MemberAccess;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Prefix marking a legacy secret value as a reference into the vault.
const VAULT_REFERENCE_PREFIX: &str = "vault:";

/// Well-known path properties and whether each must exist.
const WELL_KNOWN_PATHS: &[(&str, bool)] = &[
    ("paths.root", true),
    ("paths.repository_root", true),
    ("paths.log", false),
    ("paths.app.config", false),
    ("paths.app.vault", false),
    ("paths.app.plugins.root", false),
];

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Must be fixed before the configuration is usable
    Error,
    /// Should be looked at
    Warning,
    /// Informational
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// Issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueCategory {
    /// Value has the wrong type
    Type,
    /// Numeric value outside its bounds
    Range,
    /// Relative or missing filesystem path
    Path,
    /// Required property missing
    Schema,
    /// String does not match its pattern
    Pattern,
    /// Custom predicate rejected the value
    Custom,
    /// Secret handling problem
    Security,
    /// Storage configuration problem
    Storage,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Type => "type",
            Self::Range => "range",
            Self::Path => "path",
            Self::Schema => "schema",
            Self::Pattern => "pattern",
            Self::Custom => "custom",
            Self::Security => "security",
            Self::Storage => "storage",
        })
    }
}

/// One finding of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity
    pub severity: Severity,
    /// Category
    pub category: IssueCategory,
    /// Offending property path
    pub path: String,
    /// Human-readable message
    pub message: String,
    /// Actual value, when meaningful
    pub actual: Option<String>,
    /// Expected value, when meaningful
    pub expected: Option<String>,
}

impl ValidationIssue {
    fn new(
        severity: Severity,
        category: IssueCategory,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
            actual: None,
            expected: None,
        }
    }

    fn with_values(mut self, actual: impl Into<String>, expected: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self.expected = Some(expected.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}: {}",
            self.severity, self.category, self.path, self.message
        )?;
        match (&self.actual, &self.expected) {
            (Some(actual), Some(expected)) => write!(f, " (actual: {actual}, expected: {expected})"),
            (Some(actual), None) => write!(f, " (actual: {actual})"),
            _ => Ok(()),
        }
    }
}

/// Rules registered by [`SchemaValidator::with_defaults`].
#[must_use]
pub fn default_schemas() -> Vec<ConfigSchema> {
    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let name_regex = NAME_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid regex"))
        .clone();

    vec![
        ConfigSchema::new("internal_name", ValueKind::String)
            .required()
            .pattern(name_regex),
        ConfigSchema::new("display_name", ValueKind::String).required(),
        ConfigSchema::new("paths.root", ValueKind::String).required(),
        ConfigSchema::new("paths.repository_root", ValueKind::String).required(),
        ConfigSchema::new("paths.log", ValueKind::String).required(),
        ConfigSchema::new("ui.width", ValueKind::Int).range(80.0, 300.0),
        ConfigSchema::new("storage", ValueKind::Dictionary).required(),
    ]
}

/// Validates configuration containers against registered rules.
pub struct SchemaValidator {
    schemas: Vec<ConfigSchema>,
    issues: Vec<ValidationIssue>,
    probe: Option<Box<dyn FilesystemProbe>>,
}

impl SchemaValidator {
    /// A validator with no rules registered.
    ///
    /// Path existence goes through `probe` when given, otherwise straight to
    /// the filesystem.
    #[must_use]
    pub fn new(probe: Option<Box<dyn FilesystemProbe>>) -> Self {
        Self {
            schemas: Vec::new(),
            issues: Vec::new(),
            probe,
        }
    }

    /// A validator with the [`default_schemas`] registered.
    #[must_use]
    pub fn with_defaults(probe: Option<Box<dyn FilesystemProbe>>) -> Self {
        let mut validator = Self::new(probe);
        validator.schemas = default_schemas();
        validator
    }

    /// Register an additional rule.
    pub fn register(&mut self, schema: ConfigSchema) -> &mut Self {
        self.schemas.push(schema);
        self
    }

    /// Registered rules.
    #[must_use]
    pub fn schemas(&self) -> &[ConfigSchema] {
        &self.schemas
    }

    /// Run every rule and check pass against `config`.
    ///
    /// Issues from earlier runs are discarded first.
    pub fn validate_configuration(&mut self, config: &dyn MemberAccess) -> &[ValidationIssue] {
        self.clear();

        self.schema_pass(config);
        self.path_pass(config);
        self.security_pass(config);
        self.storage_pass(config);

        info!(
            issues = self.issues.len(),
            errors = self.count(Severity::Error),
            warnings = self.count(Severity::Warning),
            "configuration validated"
        );
        &self.issues
    }

    /// Issues of the last run.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Issues of the last run with the given severity.
    pub fn issues_by_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// Whether the last run produced any error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Discard the issues of the last run.
    pub fn clear(&mut self) {
        self.issues.clear();
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues_by_severity(severity).count()
    }

    fn push(&mut self, issue: ValidationIssue) {
        debug!(
            severity = %issue.severity,
            category = %issue.category,
            path = %issue.path,
            "{}", issue.message
        );
        self.issues.push(issue);
    }

    fn exists(&self, path: &Path) -> bool {
        match &self.probe {
            Some(probe) => probe.exists(path),
            None => path.exists(),
        }
    }

    fn schema_pass(&mut self, config: &dyn MemberAccess) {
        let mut found = Vec::new();
        for schema in &self.schemas {
            let value = config.get_nested(&schema.segments());
            found.extend(check_schema(schema, value.as_ref()));
        }
        for issue in found {
            self.push(issue);
        }
    }

    fn path_pass(&mut self, config: &dyn MemberAccess) {
        for (property, must_exist) in WELL_KNOWN_PATHS {
            let segments = curator_core::split_path(property);
            let Some(Value::String(text)) = config.get_nested(&segments) else {
                continue;
            };

            if text.trim().is_empty() {
                self.push(ValidationIssue::new(
                    Severity::Warning,
                    IssueCategory::Path,
                    *property,
                    "path is not set",
                ));
                continue;
            }

            let path = Path::new(&text);
            if !path.is_absolute() {
                self.push(
                    ValidationIssue::new(
                        Severity::Warning,
                        IssueCategory::Path,
                        *property,
                        "path is not absolute",
                    )
                    .with_values(text.clone(), "absolute path"),
                );
            }

            if *must_exist && !self.exists(path) {
                let mut issue = ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Path,
                    *property,
                    "path does not exist",
                );
                issue.actual = Some(text.clone());
                self.push(issue);
            }
        }
    }

    fn security_pass(&mut self, config: &dyn MemberAccess) {
        if let Some(Value::Object(legacy)) = config.get_nested(&["secrets", "legacy"]) {
            for (name, value) in &legacy {
                if looks_like_plaintext(value) {
                    self.push(ValidationIssue::new(
                        Severity::Warning,
                        IssueCategory::Security,
                        format!("secrets.legacy.{name}"),
                        "plaintext secret in configuration; move it into the vault",
                    ));
                }
            }
        }

        if let Some(Value::String(database)) = config.get_nested(&["secrets", "database_path"]) {
            if !database.is_empty() && !self.exists(Path::new(&database)) {
                let mut issue = ValidationIssue::new(
                    Severity::Warning,
                    IssueCategory::Security,
                    "secrets.database_path",
                    "vault database does not exist yet",
                );
                issue.actual = Some(database);
                self.push(issue);
            }
        }
    }

    fn storage_pass(&mut self, config: &dyn MemberAccess) {
        let Some(Value::Object(groups)) = config.try_get("storage") else {
            return;
        };

        let mut serials: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut found = Vec::new();

        for (group_id, group) in &groups {
            match group.try_get("master") {
                Some(master) if master.is_object() => {
                    let path = format!("storage.{group_id}.master");
                    check_drive_serial(&master, &path, &mut serials, &mut found);
                }
                _ => found.push(ValidationIssue::new(
                    Severity::Warning,
                    IssueCategory::Storage,
                    format!("storage.{group_id}.master"),
                    "storage group has no master drive",
                )),
            }

            if let Some(Value::Object(backups)) = group.try_get("backup") {
                for (slot, drive) in &backups {
                    let path = format!("storage.{group_id}.backup.{slot}");
                    check_drive_serial(drive, &path, &mut serials, &mut found);
                }
            }
        }

        for (serial, drives) in serials.into_iter().filter(|(_, d)| d.len() > 1) {
            found.push(
                ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Storage,
                    "storage",
                    format!(
                        "serial number is configured for several drives: {}",
                        drives.join(", ")
                    ),
                )
                .with_values(serial, "unique serial number"),
            );
        }

        for issue in found {
            self.push(issue);
        }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::with_defaults(None)
    }
}

fn check_schema(schema: &ConfigSchema, value: Option<&Value>) -> Option<ValidationIssue> {
    let value = match value {
        None | Some(Value::Null) => {
            return schema.required.then(|| {
                ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Schema,
                    &schema.path,
                    "required property is missing",
                )
            });
        }
        Some(value) => value,
    };

    if !schema.kind.matches(value) {
        return Some(
            ValidationIssue::new(
                Severity::Error,
                IssueCategory::Type,
                &schema.path,
                "value has the wrong type",
            )
            .with_values(type_name(value), schema.kind.as_str()),
        );
    }

    if schema.kind.is_numeric() {
        if let Some(number) = value.as_f64() {
            let below = schema.min.is_some_and(|min| number < min);
            let above = schema.max.is_some_and(|max| number > max);
            if below || above {
                return Some(
                    ValidationIssue::new(
                        Severity::Error,
                        IssueCategory::Range,
                        &schema.path,
                        "value is out of range",
                    )
                    .with_values(value.to_string(), describe_range(schema.min, schema.max)),
                );
            }
        }
    }

    if let (Some(pattern), Some(text)) = (&schema.pattern, value.as_str()) {
        if !pattern.is_match(text) {
            return Some(
                ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Pattern,
                    &schema.path,
                    "value does not match the required pattern",
                )
                .with_values(text, pattern.as_str()),
            );
        }
    }

    if let Some(check) = &schema.custom {
        match check(value) {
            Ok(true) => {}
            Ok(false) => {
                let mut issue = ValidationIssue::new(
                    Severity::Error,
                    IssueCategory::Custom,
                    &schema.path,
                    "value rejected by custom check",
                );
                issue.actual = Some(value.to_string());
                return Some(issue);
            }
            Err(reason) => {
                return Some(ValidationIssue::new(
                    Severity::Warning,
                    IssueCategory::Custom,
                    &schema.path,
                    format!("custom check failed: {reason}"),
                ));
            }
        }
    }

    None
}

fn check_drive_serial(
    drive: &Value,
    path: &str,
    serials: &mut BTreeMap<String, Vec<String>>,
    found: &mut Vec<ValidationIssue>,
) {
    let serial = drive
        .try_get("serial_number")
        .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
        .unwrap_or_default();

    if serial.is_empty() {
        found.push(ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Storage,
            format!("{path}.serial_number"),
            "drive has no serial number and cannot be matched to a device",
        ));
    } else {
        serials.entry(serial).or_default().push(path.to_string());
    }
}

fn looks_like_plaintext(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && !s.starts_with(VAULT_REFERENCE_PREFIX) && !s.chars().all(|c| c == '*')
        }
        Value::Null => false,
        _ => true,
    }
}

fn describe_range(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{min} ..= {max}"),
        (Some(min), None) => format!(">= {min}"),
        (None, Some(max)) => format!("<= {max}"),
        (None, None) => "any".to_string(),
    }
}
