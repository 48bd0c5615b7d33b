//! Error types for argument dispatch.
//!
//! Provides a unified error type covering all failure modes between argv and
//! target invocation: config-file access and decoding, per-field validation,
//! unknown fields, flag-parser usage errors, structural schema defects, and
//! target-type mismatches.

use std::path::PathBuf;
use std::process;

use thiserror::Error;

use argspec_core::{FieldError, SchemaError};

/// Errors that can occur while driving a schema from argv to invocation.
///
/// All variants are terminal: nothing in the pipeline retries, and a config
/// failure is never downgraded to "no config".
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The `--config` path does not point at an existing file.
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The config file could not be decoded: unreadable, malformed, a
    /// non-mapping top level, or an unrecognized extension.
    #[error("cannot parse config file {}: {detail}", path.display())]
    ConfigParse {
        /// Path of the offending file.
        path: PathBuf,
        /// What went wrong, from the decoder.
        detail: String,
    },

    /// Argument values failed validation. Every offending field is listed,
    /// one per line.
    #[error("invalid arguments:{}", list(.0))]
    Validation(Vec<FieldError>),

    /// The config file supplies fields the schema does not declare.
    #[error("unknown config fields: {}", .0.join(", "))]
    UnknownFields(Vec<String>),

    /// Flag parsing failed. The display comes from the parser and includes
    /// its usage text; help and version requests also land here.
    #[error("{0}")]
    Usage(Box<clap::Error>),

    /// The registered schema is structurally invalid.
    #[error("invalid schema:{}", list(.0))]
    InvalidSchema(Vec<SchemaError>),

    /// The validated arguments do not fit the target function's argument
    /// type.
    #[error("invalid target function: {0}")]
    InvalidTarget(String),
}

fn list<E: std::fmt::Display>(errors: &[E]) -> String {
    let mut out = String::new();
    for error in errors {
        out.push_str("\n  ");
        out.push_str(&error.to_string());
    }
    out
}

impl From<clap::Error> for DispatchError {
    fn from(error: clap::Error) -> Self {
        DispatchError::Usage(Box::new(error))
    }
}

impl DispatchError {
    /// Process exit code for this error.
    ///
    /// Usage errors defer to the flag parser's convention (2 for parse
    /// errors, 0 for help display); everything else exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::Usage(error) => error.exit_code(),
            _ => 1,
        }
    }

    /// Prints the error the way a command-line tool should and exits.
    ///
    /// Usage errors are rendered by the flag parser itself (colored, with
    /// usage text); all other errors print a single `error: ...` line to
    /// stderr and exit 1.
    pub fn exit(self) -> ! {
        match self {
            DispatchError::Usage(error) => error.exit(),
            error => {
                eprintln!("error: {error}");
                process::exit(1);
            }
        }
    }
}

/// Convenience alias for results with [`DispatchError`].
pub type Result<T> = std::result::Result<T, DispatchError>;
