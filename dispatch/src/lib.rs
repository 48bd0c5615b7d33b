//! Everything between argv and a validated argument object.
//!
//! This crate turns an [`argspec_core::Schema`] into a working command-line
//! entry point:
//!
//! - [`decode_config_file`] — reads a TOML/YAML/JSON config file into the
//!   pipeline's value model, dispatching on the file extension.
//! - [`normalize_args`] — pure underscore-to-hyphen normalization of
//!   long-flag tokens, so `--max_retries` and `--max-retries` agree.
//! - [`build_command`] / [`extract_explicit`] — derive the [`clap`] flag
//!   surface from the schema and read back which flags the user actually
//!   typed.
//! - [`parse_from`] / [`run_from`] and friends — the driver, which threads
//!   one argument list through the prescan, the config file, the full
//!   parse, the merge, and final validation, then hands the result to a
//!   target function as its typed argument struct.
//!
//! Flag parsing itself stays clap's job: help text, unknown-flag rejection,
//! and missing-required-argument reporting all come from clap against the
//! surface this crate builds.
//!
//! # Example
//!
//! ```
//! use argspec_core::{FieldSpec, Schema, ValueKind};
//! use argspec_dispatch::run_from;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Ingest {
//!     threshold: f64,
//!     max_retries: i64,
//! }
//!
//! let schema = Schema::new("ingest")
//!     .with_field(FieldSpec::required("threshold", ValueKind::Float))
//!     .with_field(FieldSpec::with_default("max_retries", ValueKind::Integer, json!(3)));
//!
//! let attempts = run_from(
//!     &schema,
//!     ["ingest", "--threshold", "0.5"],
//!     |args: Ingest| args.max_retries,
//! )?;
//! assert_eq!(attempts, 3);
//! # Ok::<(), argspec_dispatch::DispatchError>(())
//! ```

mod config;
mod driver;
mod error;
mod normalize;
mod surface;

pub use config::decode_config_file;
pub use driver::{parse, parse_from, run, run_from, run_or_exit};
pub use error::{DispatchError, Result};
pub use normalize::normalize_args;
pub use surface::{build_command, extract_explicit};
