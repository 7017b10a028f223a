//! Declarative validation rules.
//!
//! A [`ConfigSchema`] is data: a dot-separated path, an expected kind and
//! optional constraints. The [`SchemaValidator`](crate::SchemaValidator)
//! interprets the rules against any [`MemberAccess`](curator_core::MemberAccess)
//! container.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Custom predicate over a resolved value.
///
/// `Ok(false)` means the value is rejected; `Err` means the predicate itself
/// failed and is reported as a warning.
pub type CustomCheck = Arc<dyn Fn(&Value) -> Result<bool, String> + Send + Sync>;

/// Expected type of a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Text
    String,
    /// Whole number
    Int,
    /// `true` / `false`
    Bool,
    /// Fixed-shape table
    Map,
    /// Table with arbitrary keys
    Dictionary,
    /// List
    Array,
    /// Any number
    Float,
}

impl ValueKind {
    /// Whether `value` is of this kind.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
            Self::Map | Self::Dictionary => value.is_object(),
            Self::Array => value.is_array(),
            Self::Float => value.is_number(),
        }
    }

    /// Whether range bounds apply to this kind.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Lowercase name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Map => "map",
            Self::Dictionary => "dictionary",
            Self::Array => "array",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the JSON type of `value`, as reported in type mismatch issues.
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// One validation rule.
#[derive(Clone)]
pub struct ConfigSchema {
    /// Dot-separated property path
    pub path: String,
    /// Expected kind
    pub kind: ValueKind,
    /// Whether a missing or null value is an error
    pub required: bool,
    /// Inclusive lower bound (numeric kinds only)
    pub min: Option<f64>,
    /// Inclusive upper bound (numeric kinds only)
    pub max: Option<f64>,
    /// Pattern a string value must match
    pub pattern: Option<Regex>,
    /// Custom predicate
    pub custom: Option<CustomCheck>,
}

impl ConfigSchema {
    /// An optional rule with no constraints besides the kind.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            path: path.into(),
            kind,
            required: false,
            min: None,
            max: None,
            pattern: None,
            custom: None,
        }
    }

    /// Mark the rule as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Inclusive numeric range.
    #[must_use]
    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Pattern a string value must match.
    #[must_use]
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Custom predicate.
    #[must_use]
    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(check));
        self
    }

    /// Path split into segments.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        curator_core::split_path(&self.path)
    }
}

impl fmt::Debug for ConfigSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSchema")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("custom", &self.custom.is_some())
            .finish()
    }
}
