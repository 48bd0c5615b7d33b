//! Schema relaxation for partial inputs.
//!
//! A config file is allowed to supply any subset of the schema's fields, so
//! it cannot be validated against the original schema directly: missing
//! required fields would be reported even though flags may still supply them.
//! [`relax_schema`] derives a schema in which every field is optional and
//! nullable, while keeping names, kinds, and declaration order intact. The
//! relaxed schema still rejects unknown fields and wrongly-typed values.
//!
//! # Example
//!
//! ```
//! use argspec_core::{relax_schema, FieldSpec, Schema, ValueKind};
//!
//! let schema = Schema::new("ingest")
//!     .with_field(FieldSpec::required("threshold", ValueKind::Float));
//!
//! let relaxed = relax_schema(&schema);
//! assert!(!relaxed.field("threshold").unwrap().is_required());
//! assert!(relaxed.field("threshold").unwrap().is_nullable());
//!
//! // The source schema is untouched.
//! assert!(schema.field("threshold").unwrap().is_required());
//! ```

use serde_json::Value;

use crate::{FieldSpec, Schema};

/// Derives a fully-optional copy of a schema.
///
/// Every field in the returned schema has a `null` default, so a mapping
/// validated against it may omit any field and may hold `null` for any field.
/// Kinds, names, descriptions, and field order are preserved; the input
/// schema is never mutated.
///
/// # Examples
///
/// ```
/// use argspec_core::{relax_schema, FieldSpec, Schema, ValueKind};
/// use serde_json::json;
///
/// let schema = Schema::new("ingest")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float))
///     .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)));
///
/// let relaxed = relax_schema(&schema);
/// assert_eq!(relaxed.field_names(), schema.field_names());
/// assert!(relaxed.fields.iter().all(|f| f.is_nullable()));
/// ```
pub fn relax_schema(schema: &Schema) -> Schema {
    Schema {
        name: schema.name.clone(),
        description: schema.description.clone(),
        fields: schema.fields.iter().map(relax_field).collect(),
    }
}

fn relax_field(field: &FieldSpec) -> FieldSpec {
    FieldSpec {
        name: field.name.clone(),
        kind: field.kind.clone(),
        default: Some(Value::Null),
        description: field.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::ValueKind;

    use super::*;

    fn sample_schema() -> Schema {
        Schema::new("ingest")
            .with_field(FieldSpec::required("threshold", ValueKind::Float))
            .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)))
            .with_field(FieldSpec::optional("tag", ValueKind::String))
    }

    #[test]
    fn test_relax_makes_every_field_nullable() {
        let relaxed = relax_schema(&sample_schema());

        assert!(relaxed.fields.iter().all(|f| f.is_nullable()));
        assert!(relaxed.fields.iter().all(|f| !f.is_required()));
    }

    #[test]
    fn test_relax_preserves_names_kinds_and_order() {
        let schema = sample_schema();
        let relaxed = relax_schema(&schema);

        assert_eq!(relaxed.field_names(), schema.field_names());
        assert_eq!(
            relaxed.field("threshold").unwrap().kind,
            ValueKind::Float
        );
        assert_eq!(relaxed.field("count").unwrap().kind, ValueKind::Integer);
    }

    #[test]
    fn test_relax_does_not_mutate_source() {
        let schema = sample_schema();
        let _relaxed = relax_schema(&schema);

        assert!(schema.field("threshold").unwrap().is_required());
        assert_eq!(schema.field("count").unwrap().default, Some(json!(1)));
    }

    #[test]
    fn test_relax_is_idempotent() {
        let once = relax_schema(&sample_schema());
        let twice = relax_schema(&once);

        assert_eq!(once, twice);
    }
}
