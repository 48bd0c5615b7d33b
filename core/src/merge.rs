//! Value merging across argument sources.
//!
//! A field's final value can come from three places: the schema default, the
//! config file, or an explicitly typed command-line flag. [`merge_values`]
//! layers the three sources into a single mapping, weakest source first, so
//! that config values override defaults and explicit flags override both.
//!
//! A flag value that merely echoes the flag's default does not count as
//! explicit; callers are expected to pass only values the user actually
//! typed (the dispatch layer extracts these from the parser's value
//! provenance).
//!
//! # Example
//!
//! ```
//! use argspec_core::*;
//! use serde_json::json;
//!
//! let schema = Schema::new("ingest")
//!     .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)))
//!     .with_field(FieldSpec::optional("tag", ValueKind::String));
//!
//! let flags = json!({ "count": 9 }).as_object().unwrap().clone();
//! let config = json!({ "count": 5, "tag": "daily" }).as_object().unwrap().clone();
//!
//! let merged = merge_values(&schema, &flags, Some(&config));
//! assert_eq!(merged["count"], json!(9));  // flag beats config
//! assert_eq!(merged["tag"], json!("daily")); // config beats default
//! ```

use serde_json::{Map, Value};

use crate::Schema;

/// Merges defaults, config values, and explicit flag values into one mapping.
///
/// Layers from weakest to strongest:
///
/// 1. schema defaults (required fields contribute nothing),
/// 2. `config` entries, when a config mapping is present,
/// 3. `explicit_flags` entries.
///
/// `null` entries in `config` are treated as "not set" and skipped, so a
/// config file can mention a field without overriding its default. Keys
/// outside the schema are carried through untouched; rejecting them is the
/// validator's job, and dropping them here would make unknown fields pass
/// silently.
///
/// # Examples
///
/// ```
/// use argspec_core::*;
/// use serde_json::{json, Map};
///
/// let schema = Schema::new("ingest")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float))
///     .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)));
///
/// let config = json!({ "threshold": 0.5 }).as_object().unwrap().clone();
/// let merged = merge_values(&schema, &Map::new(), Some(&config));
///
/// assert_eq!(merged["threshold"], json!(0.5)); // required field satisfied by config
/// assert_eq!(merged["count"], json!(1)); // default survives
/// ```
pub fn merge_values(
    schema: &Schema,
    explicit_flags: &Map<String, Value>,
    config: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let mut merged = Map::new();

    for field in &schema.fields {
        if let Some(default) = &field.default {
            merged.insert(field.name.clone(), default.clone());
        }
    }

    if let Some(config) = config {
        for (key, value) in config {
            if value.is_null() {
                continue;
            }
            merged.insert(key.clone(), value.clone());
        }
    }

    for (key, value) in explicit_flags {
        merged.insert(key.clone(), value.clone());
    }

    merged
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{FieldSpec, ValueKind};

    use super::*;

    fn sample_schema() -> Schema {
        Schema::new("ingest")
            .with_field(FieldSpec::required("threshold", ValueKind::Float))
            .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)))
            .with_field(FieldSpec::optional("tag", ValueKind::String))
    }

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_merge_defaults_alone() {
        let merged = merge_values(&sample_schema(), &Map::new(), None);

        assert_eq!(merged.get("threshold"), None);
        assert_eq!(merged["count"], json!(1));
        assert_eq!(merged["tag"], Value::Null);
    }

    #[test]
    fn test_merge_config_overrides_defaults() {
        let config = as_map(json!({ "count": 5, "tag": "daily" }));
        let merged = merge_values(&sample_schema(), &Map::new(), Some(&config));

        assert_eq!(merged["count"], json!(5));
        assert_eq!(merged["tag"], json!("daily"));
    }

    #[test]
    fn test_merge_explicit_flags_override_config() {
        let flags = as_map(json!({ "count": 9 }));
        let config = as_map(json!({ "count": 5 }));
        let merged = merge_values(&sample_schema(), &flags, Some(&config));

        assert_eq!(merged["count"], json!(9));
    }

    #[test]
    fn test_merge_null_config_entries_do_not_override() {
        let config = as_map(json!({ "count": null }));
        let merged = merge_values(&sample_schema(), &Map::new(), Some(&config));

        assert_eq!(merged["count"], json!(1));
    }

    #[test]
    fn test_merge_carries_unknown_config_keys_for_validation() {
        let config = as_map(json!({ "extra": true }));
        let merged = merge_values(&sample_schema(), &Map::new(), Some(&config));

        assert_eq!(merged["extra"], json!(true));
    }

    #[test]
    fn test_merge_required_field_from_config_only() {
        let config = as_map(json!({ "threshold": 0.5 }));
        let merged = merge_values(&sample_schema(), &Map::new(), Some(&config));

        assert_eq!(merged["threshold"], json!(0.5));
    }
}
