//! Core schema types and validation for schema-driven argument parsing.
//!
//! This crate defines the data model a command-line surface is derived from
//! and the pure operations on it:
//!
//! - [`Schema`] — the argument surface for one target function: named,
//!   typed fields in declaration order.
//! - [`FieldSpec`] — a single field with a [`ValueKind`], an optional
//!   default, and help text.
//! - [`ArgumentSet`] — the validated, fully-populated argument object handed
//!   to the target function.
//!
//! Relaxation ([`relax_schema`]) derives the all-optional schema variant used
//! to validate partial config-file input.
//!
//! Validation ([`validate_schema`], [`validate_mapping`],
//! [`validate_arguments`]) catches structural schema defects and enumerates
//! every offending field of a decoded mapping.
//!
//! Merging ([`merge_values`]) layers schema defaults, config values, and
//! explicitly typed flags into the final mapping.
//!
//! # Example
//!
//! ```
//! use argspec_core::*;
//! use serde_json::{json, Map};
//!
//! // Describe the argument surface
//! let schema = Schema::new("ingest")
//!     .with_description("Ingest a data feed")
//!     .with_field(
//!         FieldSpec::required("threshold", ValueKind::Float)
//!             .with_description("Trigger level"),
//!     )
//!     .with_field(FieldSpec::with_default("max_retries", ValueKind::Integer, json!(3)));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // A config file satisfies the required field, a flag overrides the default
//! let config = json!({ "threshold": 0.5 }).as_object().unwrap().clone();
//! let flags = json!({ "max_retries": 5 }).as_object().unwrap().clone();
//!
//! let merged = merge_values(&schema, &flags, Some(&config));
//! let args = validate_arguments(&schema, merged).unwrap();
//!
//! assert_eq!(args.get_f64("threshold"), Some(0.5));
//! assert_eq!(args.get_i64("max_retries"), Some(5));
//! ```

mod arguments;
mod merge;
mod relax;
mod types;
mod validate;

pub use arguments::ArgumentSet;
pub use merge::merge_values;
pub use relax::relax_schema;
pub use types::{FieldSpec, Schema, ValueKind};
pub use validate::{
    CONFIG_FLAG, FieldError, SchemaError, validate_arguments, validate_mapping, validate_schema,
};
