//! Schema type definitions for argument surfaces.
//!
//! This module defines the data model that a command-line surface is derived
//! from. The types are designed for serialization with [`serde`] and can
//! round-trip through JSON and YAML, so schemas can live in files as well as
//! in code.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value kind for schema fields.
///
/// Describes what kind of value a field holds, which determines the value
/// parser attached to the field's generated flag and how config-file values
/// are checked.
///
/// # Examples
///
/// ```
/// use argspec_core::ValueKind;
///
/// let kind = ValueKind::default();
/// assert_eq!(kind, ValueKind::String);
///
/// let format = ValueKind::Choice(vec!["json".into(), "yaml".into()]);
/// assert!(matches!(format, ValueKind::Choice(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValueKind {
    /// Boolean value (`true`/`false`).
    Bool,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float. Integer values widen to floats.
    Float,
    /// Free-form string (the default).
    #[default]
    String,
    /// One of a fixed set of strings (e.g., `--format json|yaml`).
    Choice(Vec<String>),
    /// Homogeneous list of an element kind. Lists of lists are rejected by
    /// structural validation, since no flag syntax exists for them.
    List(Box<ValueKind>),
}

impl ValueKind {
    /// Checks whether a decoded value matches this kind.
    ///
    /// The check is strict: strings are never read as numbers and numbers are
    /// never read as strings. The one widening allowed is integer → float.
    /// `null` never matches a kind; nullability is a property of the field,
    /// not the kind (see [`FieldSpec::accepts`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::ValueKind;
    /// use serde_json::json;
    ///
    /// assert!(ValueKind::Integer.accepts(&json!(42)));
    /// assert!(!ValueKind::Integer.accepts(&json!("42")));
    ///
    /// assert!(ValueKind::Float.accepts(&json!(42)));
    /// assert!(!ValueKind::Bool.accepts(&json!(null)));
    /// ```
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueKind::Bool => value.is_boolean(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            ValueKind::Float => value.is_number(),
            ValueKind::String => value.is_string(),
            ValueKind::Choice(choices) => value
                .as_str()
                .is_some_and(|s| choices.iter().any(|c| c == s)),
            ValueKind::List(element) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| element.accepts(item))),
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Choice(choices) => write!(f, "choice of [{}]", choices.join(", ")),
            ValueKind::List(element) => write!(f, "list of {element}"),
        }
    }
}

/// Schema for a single named field.
///
/// A field has a `snake_case` name, a [`ValueKind`], an optional default, and
/// an optional description used as help text. A field with no default is
/// required; a field whose default is `null` is optional and nullable.
///
/// Use the constructor methods [`required`](FieldSpec::required),
/// [`optional`](FieldSpec::optional), and
/// [`with_default`](FieldSpec::with_default) to create fields, then chain
/// builder methods like [`with_description`](FieldSpec::with_description).
///
/// # Examples
///
/// ```
/// use argspec_core::{FieldSpec, ValueKind};
/// use serde_json::json;
///
/// let threshold = FieldSpec::required("threshold", ValueKind::Float)
///     .with_description("Trigger level");
/// assert!(threshold.is_required());
///
/// let retries = FieldSpec::with_default("max_retries", ValueKind::Integer, json!(3));
/// assert!(!retries.is_required());
/// assert_eq!(retries.flag_name(), "max-retries");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name in `snake_case` (e.g., "max_retries")
    pub name: String,
    /// Kind of value the field holds
    pub kind: ValueKind,
    /// Default value; `None` means the field is required
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    /// Description used as the flag's help text
    pub description: Option<String>,
}

/// A present-but-null default must deserialize to `Some(Null)`, not `None`;
/// an absent key (required field) is the only source of `None`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl FieldSpec {
    /// Creates a required field (no default).
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::{FieldSpec, ValueKind};
    ///
    /// let field = FieldSpec::required("threshold", ValueKind::Float);
    /// assert!(field.is_required());
    /// assert!(!field.is_nullable());
    /// ```
    pub fn required(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: None,
            description: None,
        }
    }

    /// Creates an optional, nullable field (default `null`).
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::{FieldSpec, ValueKind};
    ///
    /// let field = FieldSpec::optional("tag", ValueKind::String);
    /// assert!(!field.is_required());
    /// assert!(field.is_nullable());
    /// ```
    pub fn optional(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: Some(Value::Null),
            description: None,
        }
    }

    /// Creates an optional field with a concrete default.
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::{FieldSpec, ValueKind};
    /// use serde_json::json;
    ///
    /// let field = FieldSpec::with_default("count", ValueKind::Integer, json!(1));
    /// assert_eq!(field.default, Some(json!(1)));
    /// ```
    pub fn with_default(name: &str, kind: ValueKind, default: Value) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: Some(default),
            description: None,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Whether the field must end up with a non-null value.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Whether `null` is an acceptable final value for the field.
    pub fn is_nullable(&self) -> bool {
        matches!(self.default, Some(Value::Null))
    }

    /// Returns the long-flag spelling of the field name.
    ///
    /// Underscores become hyphens, so the field `max_retries` surfaces as
    /// `--max-retries`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::{FieldSpec, ValueKind};
    ///
    /// let field = FieldSpec::required("max_retries", ValueKind::Integer);
    /// assert_eq!(field.flag_name(), "max-retries");
    /// ```
    pub fn flag_name(&self) -> String {
        self.name.replace('_', "-")
    }

    /// Checks whether a value is acceptable for this field.
    ///
    /// `null` is accepted only for nullable fields; everything else defers to
    /// [`ValueKind::accepts`].
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::{FieldSpec, ValueKind};
    /// use serde_json::json;
    ///
    /// let tag = FieldSpec::optional("tag", ValueKind::String);
    /// assert!(tag.accepts(&json!(null)));
    ///
    /// let count = FieldSpec::with_default("count", ValueKind::Integer, json!(1));
    /// assert!(!count.accepts(&json!(null)));
    /// ```
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            self.is_nullable()
        } else {
            self.kind.accepts(value)
        }
    }
}

/// Complete schema for an argument surface.
///
/// This is the primary type in the crate. It names the generated command and
/// lists its fields in declaration order, which is also the order of the
/// generated flag surface and of help output. A schema is built once per
/// target function and never mutated afterwards; derived forms (such as the
/// relaxed schema used for config-file validation) are fresh copies.
///
/// # Examples
///
/// ```
/// use argspec_core::{FieldSpec, Schema, ValueKind};
/// use serde_json::json;
///
/// let schema = Schema::new("ingest")
///     .with_description("Ingest a data feed")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float))
///     .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)));
///
/// assert_eq!(schema.name, "ingest");
/// assert_eq!(schema.field_names(), vec!["threshold", "count"]);
/// assert!(schema.field("threshold").is_some());
/// assert!(!schema.contains("verbose"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Name used for the generated command
    pub name: String,
    /// About line for help output
    pub description: Option<String>,
    /// Fields in declaration order
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    /// Creates an empty schema with the given command name.
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::Schema;
    ///
    /// let schema = Schema::new("ingest");
    /// assert_eq!(schema.name, "ingest");
    /// assert!(schema.fields.is_empty());
    /// ```
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Adds a field.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Finds a field by name.
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::{FieldSpec, Schema, ValueKind};
    ///
    /// let schema = Schema::new("ingest")
    ///     .with_field(FieldSpec::required("threshold", ValueKind::Float));
    ///
    /// assert!(schema.field("threshold").is_some());
    /// assert!(schema.field("missing").is_none());
    /// ```
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the schema declares a field with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Gets all field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
