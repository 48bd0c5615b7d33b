//! The entry-point driver.
//!
//! Ties the pipeline together for one invocation: structural schema check,
//! argv normalization, a known-args scan for `--config`, config decoding and
//! relaxed validation, the full flag parse, the merge, and full validation.
//! [`parse_from`] stops at the validated [`ArgumentSet`]; [`run_from`]
//! additionally deserializes it into the caller's argument struct and calls
//! the target function; [`run_or_exit`] adds the process-exit behavior a
//! binary entry point wants.
//!
//! The schema is registered explicitly by the caller. Nothing inspects the
//! target function's signature; the target's argument type only has to
//! implement `DeserializeOwned`, and a shape mismatch between that type and
//! the schema is reported as [`DispatchError::InvalidTarget`].

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use argspec_core::{
    ArgumentSet, CONFIG_FLAG, FieldError, Schema, merge_values, relax_schema, validate_arguments,
    validate_mapping, validate_schema,
};

use crate::config::decode_config_file;
use crate::error::{DispatchError, Result};
use crate::normalize::normalize_args;
use crate::surface::{build_command, extract_explicit};

/// Parses an argument list against a schema into a validated [`ArgumentSet`].
///
/// The list must include the program name in first position, like
/// `std::env::args`. The pipeline runs in order:
///
/// 1. structural validation of `schema` ([`DispatchError::InvalidSchema`] on
///    any defect),
/// 2. normalization of a copy of the list (`--max_retries` →
///    `--max-retries`),
/// 3. a known-args scan that reads only the `--config` tokens,
/// 4. if a config path was given: decode, relax, and strictly validate the
///    file (a failing config fails the invocation; it is never treated as
///    "no config"),
/// 5. the full flag parse, with requiredness lifted for fields the config
///    supplies,
/// 6. merge of defaults, config values, and explicitly typed flags,
/// 7. full validation against the original schema.
///
/// # Errors
///
/// Any [`DispatchError`] variant except `InvalidTarget`, which can only
/// arise in [`run_from`].
///
/// # Examples
///
/// ```
/// use argspec_core::{FieldSpec, Schema, ValueKind};
/// use argspec_dispatch::parse_from;
/// use serde_json::json;
///
/// let schema = Schema::new("ingest")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float))
///     .with_field(FieldSpec::with_default("max_retries", ValueKind::Integer, json!(3)));
///
/// let args = parse_from(&schema, ["ingest", "--threshold", "0.5"])?;
/// assert_eq!(args.get_f64("threshold"), Some(0.5));
/// assert_eq!(args.get_i64("max_retries"), Some(3));
/// # Ok::<(), argspec_dispatch::DispatchError>(())
/// ```
pub fn parse_from<I>(schema: &Schema, argv: I) -> Result<ArgumentSet>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let defects = validate_schema(schema);
    if !defects.is_empty() {
        return Err(DispatchError::InvalidSchema(defects));
    }

    let argv = normalize_args(argv);
    let config = match scan_config_path(&argv) {
        Some(path) => Some(load_config(schema, &path)?),
        None => None,
    };

    let matches = build_command(schema, config.as_ref()).try_get_matches_from(&argv)?;
    let explicit = extract_explicit(schema, &matches);

    let merged = merge_values(schema, &explicit, config.as_ref());
    validate_arguments(schema, merged).map_err(DispatchError::Validation)
}

/// Parses the process arguments against a schema.
///
/// Equivalent to [`parse_from`] over `std::env::args`.
///
/// # Errors
///
/// Same as [`parse_from`].
pub fn parse(schema: &Schema) -> Result<ArgumentSet> {
    parse_from(schema, std::env::args())
}

/// Parses an argument list and invokes a target function with the result.
///
/// The validated [`ArgumentSet`] is deserialized into the target's argument
/// type `T` and passed by value; the target's return value is passed back to
/// the caller. Additional caller state reaches the target through closure
/// capture.
///
/// # Errors
///
/// Everything [`parse_from`] can return, plus
/// [`DispatchError::InvalidTarget`] when `T`'s shape does not match the
/// schema.
///
/// # Examples
///
/// ```
/// use argspec_core::{FieldSpec, Schema, ValueKind};
/// use argspec_dispatch::run_from;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Ingest {
///     threshold: f64,
/// }
///
/// let schema = Schema::new("ingest")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float));
///
/// let doubled = run_from(&schema, ["ingest", "--threshold", "0.5"], |args: Ingest| {
///     args.threshold * 2.0
/// })?;
/// assert_eq!(doubled, 1.0);
/// # Ok::<(), argspec_dispatch::DispatchError>(())
/// ```
pub fn run_from<I, T, R>(schema: &Schema, argv: I, target: impl FnOnce(T) -> R) -> Result<R>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    T: DeserializeOwned,
{
    let args = parse_from(schema, argv)?;
    let typed: T = args
        .into_typed()
        .map_err(|e| DispatchError::InvalidTarget(e.to_string()))?;
    Ok(target(typed))
}

/// Parses the process arguments and invokes a target function.
///
/// Equivalent to [`run_from`] over `std::env::args`.
///
/// # Errors
///
/// Same as [`run_from`].
pub fn run<T, R>(schema: &Schema, target: impl FnOnce(T) -> R) -> Result<R>
where
    T: DeserializeOwned,
{
    run_from(schema, std::env::args(), target)
}

/// Parses the process arguments and invokes a target function, exiting the
/// process on any failure.
///
/// This is the intended `fn main` shape for a schema-driven binary: usage
/// errors (including `--help`) are rendered by the flag parser with its own
/// exit convention, and every other error prints a single `error: ...` line
/// to stderr and exits 1.
///
/// # Examples
///
/// ```no_run
/// use argspec_core::{FieldSpec, Schema, ValueKind};
/// use argspec_dispatch::run_or_exit;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Ingest {
///     threshold: f64,
/// }
///
/// let schema = Schema::new("ingest")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float));
///
/// run_or_exit(&schema, |args: Ingest| {
///     println!("threshold: {}", args.threshold);
/// });
/// ```
pub fn run_or_exit<T, R>(schema: &Schema, target: impl FnOnce(T) -> R) -> R
where
    T: DeserializeOwned,
{
    match run(schema, target) {
        Ok(value) => value,
        Err(error) => error.exit(),
    }
}

/// Reads the `--config` value out of a normalized argument list without
/// parsing the rest of the surface, the known-args equivalent of a full
/// parse: every other token is skipped, wherever it sits. Both the spaced
/// and the `=` form are recognized, the last occurrence wins (matching the
/// full parse), and everything after a bare `--` is positional and never
/// scanned. A trailing `--config` with no value is left for the full parse
/// to report.
fn scan_config_path(argv: &[String]) -> Option<PathBuf> {
    let flag = format!("--{CONFIG_FLAG}");
    let prefix = format!("--{CONFIG_FLAG}=");
    let mut path = None;

    let mut tokens = argv.iter().skip(1);
    while let Some(token) = tokens.next() {
        if token == "--" {
            break;
        }
        if *token == flag {
            if let Some(value) = tokens.next() {
                path = Some(PathBuf::from(value));
            }
        } else if let Some(value) = token.strip_prefix(&prefix) {
            path = Some(PathBuf::from(value));
        }
    }

    debug!(config = ?path, "prescan complete");
    path
}

/// Decodes the config file and validates it against the relaxed schema.
/// Null entries are dropped so they read as "not set" downstream.
fn load_config(schema: &Schema, path: &Path) -> Result<Map<String, Value>> {
    let mapping = decode_config_file(path)?;

    let relaxed = relax_schema(schema);
    let issues = validate_mapping(&relaxed, &mapping);
    if !issues.is_empty() {
        if issues.iter().all(|i| matches!(i, FieldError::Unknown(_))) {
            let fields = issues
                .into_iter()
                .map(|i| i.field_name().to_string())
                .collect();
            return Err(DispatchError::UnknownFields(fields));
        }
        return Err(DispatchError::Validation(issues));
    }

    let mapping: Map<String, Value> = mapping
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .collect();
    debug!(path = %path.display(), fields = mapping.len(), "config accepted");
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use argspec_core::{FieldSpec, ValueKind};
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn sample_schema() -> Schema {
        Schema::new("ingest")
            .with_description("Ingest a data feed")
            .with_field(
                FieldSpec::required("threshold", ValueKind::Float)
                    .with_description("Trigger level"),
            )
            .with_field(FieldSpec::with_default("max_retries", ValueKind::Integer, json!(3)))
            .with_field(FieldSpec::optional("tag", ValueKind::String))
    }

    fn write_config(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_flags_alone_produce_complete_arguments() {
        let args = parse_from(&sample_schema(), ["ingest", "--threshold", "0.5"]).unwrap();

        assert_eq!(args.get_f64("threshold"), Some(0.5));
        assert_eq!(args.get_i64("max_retries"), Some(3));
        assert_eq!(args.get("tag"), Some(&Value::Null));
    }

    #[test]
    fn test_config_alone_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "ingest.toml",
            "threshold = 0.5\nmax_retries = 7\ntag = \"daily\"\n",
        );

        let args = parse_from(&sample_schema(), ["ingest", "--config", &path]).unwrap();
        assert_eq!(args.get_f64("threshold"), Some(0.5));
        assert_eq!(args.get_i64("max_retries"), Some(7));
        assert_eq!(args.get_str("tag"), Some("daily"));
    }

    #[test]
    fn test_explicit_flag_beats_config_value() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "ingest.yaml", "threshold: 0.5\nmax_retries: 7\n");

        let args = parse_from(
            &sample_schema(),
            ["ingest", "--config", &path, "--max-retries", "9"],
        )
        .unwrap();

        assert_eq!(args.get_i64("max_retries"), Some(9));
        assert_eq!(args.get_f64("threshold"), Some(0.5));
    }

    #[test]
    fn test_flag_default_does_not_shadow_config_value() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "ingest.toml", "threshold = 0.5\nmax_retries = 7\n");

        // max_retries not typed on the command line, so the config wins over
        // the flag's default of 3.
        let args = parse_from(&sample_schema(), ["ingest", "--config", &path]).unwrap();
        assert_eq!(args.get_i64("max_retries"), Some(7));
    }

    #[test]
    fn test_config_satisfies_required_field() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "ingest.json", r#"{ "threshold": 0.5 }"#);

        let args = parse_from(&sample_schema(), ["ingest", "--config", &path]).unwrap();
        assert_eq!(args.get_f64("threshold"), Some(0.5));
    }

    #[test]
    fn test_missing_required_flag_is_a_usage_error_naming_the_flag() {
        let error = parse_from(&sample_schema(), ["ingest"]).unwrap_err();

        match error {
            DispatchError::Usage(inner) => {
                assert!(inner.to_string().contains("--threshold"));
            }
            other => panic!("expected Usage, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_config_fields_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "ingest.toml", "threshold = 0.5\nextra = 1\n");

        let error = parse_from(&sample_schema(), ["ingest", "--config", &path]).unwrap_err();
        match error {
            DispatchError::UnknownFields(fields) => {
                assert_eq!(fields, vec!["extra".to_string()]);
            }
            other => panic!("expected UnknownFields, got {other:?}"),
        }
    }

    #[test]
    fn test_mistyped_config_value_is_a_validation_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "ingest.yaml", "max_retries: \"abc\"\n");

        let error = parse_from(
            &sample_schema(),
            ["ingest", "--config", &path, "--threshold", "0.5"],
        )
        .unwrap_err();

        match error {
            DispatchError::Validation(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field_name(), "max_retries");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_config_file_fails_not_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        let error = parse_from(
            &sample_schema(),
            ["ingest", "--config", path.to_str().unwrap(), "--threshold", "0.5"],
        )
        .unwrap_err();

        assert!(matches!(error, DispatchError::ConfigNotFound(_)));
    }

    #[test]
    fn test_unsupported_config_extension_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "ingest.ini", "threshold = 0.5\n");

        let error = parse_from(
            &sample_schema(),
            ["ingest", "--config", &path, "--threshold", "0.5"],
        )
        .unwrap_err();

        assert!(matches!(error, DispatchError::ConfigParse { .. }));
    }

    #[test]
    fn test_null_config_value_keeps_the_default() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "ingest.yaml", "threshold: 0.5\nmax_retries: null\n");

        let args = parse_from(&sample_schema(), ["ingest", "--config", &path]).unwrap();
        assert_eq!(args.get_i64("max_retries"), Some(3));
    }

    #[test]
    fn test_underscore_flag_spelling_is_accepted() {
        let args = parse_from(
            &sample_schema(),
            ["ingest", "--threshold", "0.5", "--max_retries", "5"],
        )
        .unwrap();

        assert_eq!(args.get_i64("max_retries"), Some(5));
    }

    #[test]
    fn test_invalid_schema_fails_before_parsing() {
        let schema = Schema::new("ingest")
            .with_field(FieldSpec::required("count", ValueKind::Integer))
            .with_field(FieldSpec::required("count", ValueKind::Integer));

        let error = parse_from(&schema, ["ingest", "--count", "1"]).unwrap_err();
        assert!(matches!(error, DispatchError::InvalidSchema(_)));
    }

    #[test]
    fn test_help_request_surfaces_as_usage_with_exit_code_zero() {
        let error = parse_from(&sample_schema(), ["ingest", "--help"]).unwrap_err();

        assert!(matches!(error, DispatchError::Usage(_)));
        assert_eq!(error.exit_code(), 0);
    }

    #[test]
    fn test_run_from_invokes_target_with_typed_arguments() {
        #[derive(Deserialize)]
        struct Ingest {
            threshold: f64,
            max_retries: i64,
            tag: Option<String>,
        }

        let summary = run_from(
            &sample_schema(),
            ["ingest", "--threshold", "0.5", "--tag", "daily"],
            |args: Ingest| {
                format!(
                    "{}/{}/{}",
                    args.threshold,
                    args.max_retries,
                    args.tag.as_deref().unwrap_or("-")
                )
            },
        )
        .unwrap();

        assert_eq!(summary, "0.5/3/daily");
    }

    #[test]
    fn test_run_from_reports_shape_mismatch_as_invalid_target() {
        #[derive(Deserialize)]
        struct Wrong {
            #[allow(dead_code)]
            threshold: String,
        }

        let error = run_from(
            &sample_schema(),
            ["ingest", "--threshold", "0.5"],
            |_: Wrong| (),
        )
        .unwrap_err();

        assert!(matches!(error, DispatchError::InvalidTarget(_)));
    }

    #[test]
    fn test_target_errors_pass_through_untouched() {
        #[derive(Deserialize)]
        struct Ingest {
            threshold: f64,
        }

        let outcome = run_from(
            &sample_schema(),
            ["ingest", "--threshold", "2.5"],
            |args: Ingest| -> std::result::Result<(), String> {
                Err(format!("threshold {} out of range", args.threshold))
            },
        )
        .unwrap();

        assert_eq!(outcome, Err("threshold 2.5 out of range".to_string()));
    }

    #[test]
    fn test_scan_finds_config_wherever_it_sits() {
        let orderings: &[&[&str]] = &[
            &["ingest", "--config", "x.toml", "--threshold", "0.5"],
            &["ingest", "--threshold", "0.5", "--config", "x.toml"],
            &["ingest", "--max-retries", "9", "--config", "x.toml"],
            &["ingest", "--tag", "daily", "--config", "x.toml"],
            &["ingest", "--threshold=0.5", "--config", "x.toml"],
            &["ingest", "--threshold", "0.5", "--config=x.toml"],
        ];

        for argv in orderings {
            let argv = normalize_args(*argv);
            assert_eq!(
                scan_config_path(&argv),
                Some(PathBuf::from("x.toml")),
                "missed in {argv:?}"
            );
        }
    }

    #[test]
    fn test_scan_without_config_flag() {
        let argv = normalize_args(["ingest", "--threshold", "0.5"]);
        assert_eq!(scan_config_path(&argv), None);
    }

    #[test]
    fn test_scan_last_occurrence_wins() {
        let argv = normalize_args(["ingest", "--config", "a.toml", "--config=b.toml"]);
        assert_eq!(scan_config_path(&argv), Some(PathBuf::from("b.toml")));
    }

    #[test]
    fn test_scan_ignores_tokens_after_double_dash() {
        let argv = normalize_args(["ingest", "--threshold", "0.5", "--", "--config", "x.toml"]);
        assert_eq!(scan_config_path(&argv), None);
    }

    #[test]
    fn test_config_after_field_flags_still_satisfies_required_field() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "ingest.toml", "threshold = 0.5\n");

        let args = parse_from(
            &sample_schema(),
            ["ingest", "--max-retries", "9", "--config", &path],
        )
        .unwrap();

        assert_eq!(args.get_f64("threshold"), Some(0.5));
        assert_eq!(args.get_i64("max_retries"), Some(9));
    }

    #[test]
    fn test_config_equals_form_after_field_flags() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "ingest.yaml", "threshold: 0.5\n");
        let config_arg = format!("--config={path}");

        let args = parse_from(
            &sample_schema(),
            ["ingest", "--tag", "daily", config_arg.as_str()],
        )
        .unwrap();

        assert_eq!(args.get_f64("threshold"), Some(0.5));
        assert_eq!(args.get_str("tag"), Some("daily"));
    }
}
