//! Schema and argument validation.
//!
//! Two layers of validation run before a target function is invoked:
//! structural validation of the schema itself ([`validate_schema`]) and value
//! validation of a decoded mapping against the schema ([`validate_mapping`],
//! [`validate_arguments`]). Both collect every problem they find rather than
//! stopping at the first, so a user fixing a config file sees the complete
//! list in one pass.
//!
//! # Examples
//!
//! ```
//! use argspec_core::*;
//!
//! let schema = Schema::new("ingest")
//!     .with_field(FieldSpec::required("threshold", ValueKind::Float));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Invalid: field name is not snake_case
//! let bad = Schema::new("ingest")
//!     .with_field(FieldSpec::required("maxRetries", ValueKind::Integer));
//! assert!(!validate_schema(&bad).is_empty());
//! ```

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::{ArgumentSet, Schema, ValueKind};

/// Field name generated for the config-file flag on every surface.
pub const CONFIG_FLAG: &str = "config";

/// Structural schema errors.
///
/// Each variant describes a specific defect in a schema definition. These are
/// programmer errors in the schema, caught before any command-line parsing
/// happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Schema name is empty or whitespace-only.
    #[error("schema name cannot be empty")]
    EmptySchemaName,
    /// A field name is empty.
    #[error("field name cannot be empty")]
    EmptyFieldName,
    /// A field name is not `snake_case` (e.g., `"maxRetries"`).
    #[error("invalid field name: {0} (expected snake_case)")]
    InvalidFieldName(String),
    /// A field uses a name reserved for the generated surface.
    #[error("field name is reserved: {0}")]
    ReservedFieldName(String),
    /// Two fields share the same name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),
    /// A choice field has an empty choice set.
    #[error("choice field has no choices: {0}")]
    EmptyChoices(String),
    /// A list field nests another list.
    #[error("list field nests another list: {0}")]
    NestedList(String),
    /// A field's default value does not match its declared kind.
    #[error("default for field {field} does not match declared kind {kind}")]
    DefaultMismatch {
        /// Name of the offending field.
        field: String,
        /// The field's declared kind.
        kind: ValueKind,
    },
}

/// Per-field argument errors.
///
/// Produced when a decoded mapping is checked against a schema. The list
/// returned by [`validate_mapping`] names every offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// A required field is absent.
    #[error("missing required field: {0}")]
    Missing(String),
    /// A field holds a value of the wrong kind. Values are never coerced
    /// across kinds, so a quoted number in a config file is a mismatch.
    #[error("invalid value for field {field}: expected {expected}, found {found}")]
    Mismatch {
        /// Name of the offending field.
        field: String,
        /// The kind the schema declares.
        expected: ValueKind,
        /// Short description of the value that was found.
        found: String,
    },
    /// The mapping holds a key the schema does not declare.
    #[error("unknown field: {0}")]
    Unknown(String),
}

impl FieldError {
    /// Name of the field the error refers to.
    pub fn field_name(&self) -> &str {
        match self {
            FieldError::Missing(name) | FieldError::Unknown(name) => name,
            FieldError::Mismatch { field, .. } => field,
        }
    }
}

/// Validates the structure of a schema.
///
/// Checks for empty or malformed names, reserved names, duplicate fields,
/// empty choice sets, nested lists, and defaults that contradict their
/// field's declared kind. All defects are collected.
///
/// # Examples
///
/// ```
/// use argspec_core::*;
/// use serde_json::json;
///
/// let bad = Schema::new("ingest")
///     .with_field(FieldSpec::required("count", ValueKind::Integer))
///     .with_field(FieldSpec::required("count", ValueKind::Integer))
///     .with_field(FieldSpec::with_default("mode", ValueKind::Bool, json!("yes")));
///
/// let errors = validate_schema(&bad);
/// assert_eq!(errors.len(), 2);
/// assert!(errors.iter().any(|e| matches!(e, SchemaError::DuplicateField(_))));
/// assert!(errors.iter().any(|e| matches!(e, SchemaError::DefaultMismatch { .. })));
/// ```
pub fn validate_schema(schema: &Schema) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if schema.name.trim().is_empty() {
        errors.push(SchemaError::EmptySchemaName);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for field in &schema.fields {
        let name = field.name.as_str();
        if name.is_empty() {
            errors.push(SchemaError::EmptyFieldName);
            continue;
        }
        if !is_snake_case(name) {
            errors.push(SchemaError::InvalidFieldName(name.to_string()));
        }
        if name == CONFIG_FLAG {
            errors.push(SchemaError::ReservedFieldName(name.to_string()));
        }
        if !seen.insert(name) {
            errors.push(SchemaError::DuplicateField(name.to_string()));
        }

        errors.extend(validate_kind(name, &field.kind));

        if let Some(default) = &field.default {
            if !default.is_null() && !field.kind.accepts(default) {
                errors.push(SchemaError::DefaultMismatch {
                    field: name.to_string(),
                    kind: field.kind.clone(),
                });
            }
        }
    }

    errors
}

fn validate_kind(field: &str, kind: &ValueKind) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    match kind {
        ValueKind::Choice(choices) if choices.is_empty() => {
            errors.push(SchemaError::EmptyChoices(field.to_string()));
        }
        ValueKind::List(element) => match element.as_ref() {
            ValueKind::List(_) => errors.push(SchemaError::NestedList(field.to_string())),
            element => errors.extend(validate_kind(field, element)),
        },
        _ => {}
    }
    errors
}

fn is_snake_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Validates a decoded mapping against a schema.
///
/// Returns one [`FieldError`] per offending field: required fields that are
/// absent, values of the wrong kind, and keys the schema does not declare.
/// An empty result means the mapping is acceptable. Fields the schema
/// declares as optional may be absent without error, so validating a partial
/// mapping against a relaxed schema (see
/// [`relax_schema`](crate::relax_schema)) accepts any subset of the fields.
///
/// # Examples
///
/// ```
/// use argspec_core::*;
/// use serde_json::json;
///
/// let schema = Schema::new("ingest")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float))
///     .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)));
///
/// let mapping = json!({ "count": "abc", "extra": true });
/// let mapping = mapping.as_object().unwrap();
///
/// let errors = validate_mapping(&schema, mapping);
/// assert_eq!(errors.len(), 3); // threshold missing, count mismatched, extra unknown
/// ```
pub fn validate_mapping(schema: &Schema, mapping: &Map<String, Value>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for field in &schema.fields {
        match mapping.get(&field.name) {
            None => {
                if field.is_required() {
                    errors.push(FieldError::Missing(field.name.clone()));
                }
            }
            Some(value) => {
                if !field.accepts(value) {
                    errors.push(FieldError::Mismatch {
                        field: field.name.clone(),
                        expected: field.kind.clone(),
                        found: describe_value(value),
                    });
                }
            }
        }
    }

    for key in mapping.keys() {
        if !schema.contains(key) {
            errors.push(FieldError::Unknown(key.clone()));
        }
    }

    errors
}

/// Validates a mapping and wraps it as a complete [`ArgumentSet`].
///
/// On success the returned set holds a value for every schema field: optional
/// fields absent from the input are completed from their defaults. On failure
/// the full list of per-field errors is returned.
///
/// # Errors
///
/// Returns every [`FieldError`] found in the mapping, never just the first.
///
/// # Examples
///
/// ```
/// use argspec_core::*;
/// use serde_json::json;
///
/// let schema = Schema::new("ingest")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float))
///     .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)));
///
/// let mapping = json!({ "threshold": 0.5 }).as_object().unwrap().clone();
/// let args = validate_arguments(&schema, mapping).unwrap();
///
/// assert_eq!(args.get_f64("threshold"), Some(0.5));
/// assert_eq!(args.get_i64("count"), Some(1)); // completed from the default
/// ```
pub fn validate_arguments(
    schema: &Schema,
    mapping: Map<String, Value>,
) -> Result<ArgumentSet, Vec<FieldError>> {
    let errors = validate_mapping(schema, &mapping);
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut values = mapping;
    for field in &schema.fields {
        if !values.contains_key(&field.name) {
            if let Some(default) = &field.default {
                values.insert(field.name.clone(), default.clone());
            }
        }
    }

    Ok(ArgumentSet::new(values))
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string \"{s}\""),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
