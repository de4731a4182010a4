//! Parameter schemas and validated parameter access.
//!
//! Every transformation declares its parameters as [`ParamSpec`]
//! values. Raw specs come in as JSON maps; validation checks presence,
//! type, and option membership against the schema and the table, then
//! hands the transformation a [`Params`] with typed accessors.

use std::collections::BTreeMap;

use serde_json::Value;

use tabfuse_model::Table;

use crate::error::{Result, TransformError};

/// What kind of value a parameter takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Name of an existing column in the input table.
    Column,
    /// Free text.
    Text,
    /// Floating point number.
    Number,
    /// Whole number.
    Integer,
    /// True or false.
    Bool,
    /// One of a fixed set of choices.
    Select,
    /// JSON object of string keys to string values.
    Map,
}

impl ParamKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Text => "text",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Select => "select",
            Self::Map => "map",
        }
    }
}

/// Declaration of one transformation parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    /// Human-readable label used in error messages.
    pub label: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<Value>,
    /// Choices for [`ParamKind::Select`] parameters.
    pub options: &'static [&'static str],
    pub help: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, label: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            default: None,
            options: &[],
            help: "",
        }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            default: None,
            options: &[],
            help: "",
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_options(mut self, options: &'static [&'static str]) -> Self {
        self.options = options;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }
}

/// Validated parameters, ready for typed access.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: BTreeMap<String, Value>,
}

impl Params {
    /// Check a raw spec against the schema, filling in defaults.
    pub fn validate(
        specs: &[ParamSpec],
        raw: &serde_json::Map<String, Value>,
        table: &Table,
    ) -> Result<Self> {
        let mut values = BTreeMap::new();

        for spec in specs {
            // Blank text counts as absent, so defaults still kick in.
            let value = match raw.get(spec.name) {
                Some(Value::Null) | None => None,
                Some(Value::String(text)) if text.trim().is_empty() => None,
                Some(value) => Some(value),
            };
            let Some(value) = value else {
                if let Some(default) = &spec.default {
                    values.insert(spec.name.to_string(), default.clone());
                } else if spec.required {
                    return Err(TransformError::MissingParameter {
                        label: spec.label.to_string(),
                    });
                }
                continue;
            };
            check_kind(spec, value, table)?;
            values.insert(spec.name.to_string(), value.clone());
        }

        Ok(Self { values })
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    /// String parameter that must be present and non-blank.
    pub fn required_str(&self, name: &str, label: &str) -> Result<&str> {
        match self.str(name).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(TransformError::MissingParameter {
                label: label.to_string(),
            }),
        }
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }

    pub fn f64_or(&self, name: &str, default: f64) -> f64 {
        self.f64(name).unwrap_or(default)
    }

    pub fn usize(&self, name: &str) -> Option<usize> {
        self.values
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.values
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    pub fn map(&self, name: &str) -> Option<&serde_json::Map<String, Value>> {
        self.values.get(name).and_then(Value::as_object)
    }
}

fn check_kind(spec: &ParamSpec, value: &Value, table: &Table) -> Result<()> {
    let ok = match spec.kind {
        ParamKind::Column => {
            let Some(name) = value.as_str() else {
                return type_error(spec, "a column name");
            };
            if !table.has_column(name) {
                return Err(TransformError::ColumnNotFound {
                    column: name.to_string(),
                });
            }
            true
        }
        ParamKind::Text => value.is_string(),
        ParamKind::Number => value.is_number(),
        ParamKind::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
        ParamKind::Bool => value.is_boolean(),
        ParamKind::Select => {
            let Some(choice) = value.as_str() else {
                return type_error(spec, "one of the listed choices");
            };
            if !spec.options.contains(&choice) {
                return Err(TransformError::InvalidParameter {
                    label: spec.label.to_string(),
                    reason: format!(
                        "'{choice}' is not one of: {}",
                        spec.options.join(", ")
                    ),
                });
            }
            true
        }
        ParamKind::Map => value.is_object(),
    };

    if ok {
        Ok(())
    } else {
        type_error(spec, expected_name(spec.kind))
    }
}

fn expected_name(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::Column => "a column name",
        ParamKind::Text => "text",
        ParamKind::Number => "a number",
        ParamKind::Integer => "a whole number",
        ParamKind::Bool => "true or false",
        ParamKind::Select => "one of the listed choices",
        ParamKind::Map => "an object",
    }
}

fn type_error(spec: &ParamSpec, expected: &str) -> Result<()> {
    Err(TransformError::InvalidParameter {
        label: spec.label.to_string(),
        reason: format!("expected {expected}"),
    })
}
