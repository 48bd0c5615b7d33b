//! Flag surface generation.
//!
//! Derives a [`clap::Command`] from a [`Schema`]: one long flag per field,
//! hyphenated, with a value parser matching the field's kind, help text from
//! the field description, and clap-rendered defaults. Flag parsing itself
//! (help text, unknown-flag rejection, missing-argument reporting) stays
//! entirely clap's job.
//!
//! A field is only marked required when the schema requires it *and* the
//! decoded config file does not already supply a non-null value, so a config
//! file can stand in for flags the user did not type.

use clap::builder::{BoolishValueParser, PossibleValuesParser};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use serde_json::{Map, Value};
use tracing::debug;

use argspec_core::{CONFIG_FLAG, FieldSpec, Schema, ValueKind};

/// Builds the full flag surface for a schema.
///
/// Field flags appear in schema declaration order. A `--config <PATH>` flag
/// is included so it shows up in help output; its value is consumed by the
/// driver's prescan, and the full parse only re-accepts the token.
///
/// When `config` holds a decoded config mapping, fields it supplies with
/// non-null values are not marked required, since the merge will fill them.
///
/// # Examples
///
/// ```
/// use argspec_core::{FieldSpec, Schema, ValueKind};
/// use argspec_dispatch::build_command;
///
/// let schema = Schema::new("ingest")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float));
///
/// let matches = build_command(&schema, None)
///     .try_get_matches_from(["ingest", "--threshold", "0.5"])
///     .unwrap();
/// assert_eq!(matches.get_one::<f64>("threshold"), Some(&0.5));
/// ```
pub fn build_command(schema: &Schema, config: Option<&Map<String, Value>>) -> Command {
    let mut command = Command::new(schema.name.clone());
    if let Some(about) = &schema.description {
        command = command.about(about.clone());
    }

    command = command.arg(
        Arg::new(CONFIG_FLAG)
            .long(CONFIG_FLAG)
            .value_name("PATH")
            .help("Read argument values from a TOML/YAML/JSON file")
            .value_parser(value_parser!(std::path::PathBuf)),
    );

    for field in &schema.fields {
        command = command.arg(build_arg(field, config));
    }

    debug!(name = %schema.name, fields = schema.fields.len(), "built flag surface");
    command
}

fn build_arg(field: &FieldSpec, config: Option<&Map<String, Value>>) -> Arg {
    let mut arg = Arg::new(field.name.clone())
        .long(field.flag_name())
        .value_name(value_name(&field.kind));

    if let Some(help) = &field.description {
        arg = arg.help(help.clone());
    }

    arg = match &field.kind {
        ValueKind::List(element) => apply_parser(arg, element).action(ArgAction::Append),
        kind => apply_parser(arg, kind),
    };

    match &field.default {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            if !items.is_empty() {
                arg = arg.default_values(items.iter().map(render_scalar));
            }
        }
        Some(value) => {
            arg = arg.default_value(render_scalar(value));
        }
    }

    let satisfied = config.is_some_and(|mapping| {
        mapping
            .get(&field.name)
            .is_some_and(|value| !value.is_null())
    });
    arg.required(field.is_required() && !satisfied)
}

fn apply_parser(arg: Arg, kind: &ValueKind) -> Arg {
    match kind {
        ValueKind::Bool => arg.value_parser(BoolishValueParser::new()),
        ValueKind::Integer => arg.value_parser(value_parser!(i64)),
        ValueKind::Float => arg.value_parser(value_parser!(f64)),
        ValueKind::String => arg.value_parser(value_parser!(String)),
        ValueKind::Choice(choices) => arg.value_parser(PossibleValuesParser::new(choices.clone())),
        // Structural validation rejects nested lists before any surface is
        // built; this arm never decides real parsing behavior.
        ValueKind::List(_) => arg.value_parser(value_parser!(String)),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_name(kind: &ValueKind) -> &'static str {
    match kind {
        ValueKind::Bool => "BOOL",
        ValueKind::Integer => "INT",
        ValueKind::Float => "FLOAT",
        ValueKind::String => "STRING",
        ValueKind::Choice(_) => "CHOICE",
        ValueKind::List(element) => value_name(element),
    }
}

/// Extracts the fields the user explicitly typed on the command line.
///
/// Values that clap filled from defaults are skipped by checking each
/// field's value source, so a flag default never shadows a config value in
/// the merge. The returned mapping holds kind-typed JSON values converted
/// from clap's typed accessors.
///
/// # Examples
///
/// ```
/// use argspec_core::{FieldSpec, Schema, ValueKind};
/// use argspec_dispatch::{build_command, extract_explicit};
/// use serde_json::json;
///
/// let schema = Schema::new("ingest")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float))
///     .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)));
///
/// let matches = build_command(&schema, None)
///     .try_get_matches_from(["ingest", "--threshold", "0.5"])
///     .unwrap();
///
/// let explicit = extract_explicit(&schema, &matches);
/// assert_eq!(explicit.get("threshold"), Some(&json!(0.5)));
/// assert!(!explicit.contains_key("count")); // default, not typed
/// ```
pub fn extract_explicit(schema: &Schema, matches: &ArgMatches) -> Map<String, Value> {
    let mut explicit = Map::new();

    for field in &schema.fields {
        if matches.value_source(&field.name) != Some(ValueSource::CommandLine) {
            continue;
        }
        if let Some(value) = flag_value(field, matches) {
            explicit.insert(field.name.clone(), value);
        }
    }

    debug!(flags = explicit.len(), "extracted explicitly typed flags");
    explicit
}

fn flag_value(field: &FieldSpec, matches: &ArgMatches) -> Option<Value> {
    let id = field.name.as_str();
    match &field.kind {
        ValueKind::Bool => matches.get_one::<bool>(id).map(|b| Value::from(*b)),
        ValueKind::Integer => matches.get_one::<i64>(id).map(|i| Value::from(*i)),
        ValueKind::Float => matches.get_one::<f64>(id).map(|f| Value::from(*f)),
        ValueKind::String | ValueKind::Choice(_) => {
            matches.get_one::<String>(id).map(|s| Value::from(s.clone()))
        }
        ValueKind::List(element) => list_values(element, id, matches),
    }
}

fn list_values(element: &ValueKind, id: &str, matches: &ArgMatches) -> Option<Value> {
    let items: Vec<Value> = match element {
        ValueKind::Bool => matches.get_many::<bool>(id)?.map(|b| Value::from(*b)).collect(),
        ValueKind::Integer => matches.get_many::<i64>(id)?.map(|i| Value::from(*i)).collect(),
        ValueKind::Float => matches.get_many::<f64>(id)?.map(|f| Value::from(*f)).collect(),
        ValueKind::String | ValueKind::Choice(_) => matches
            .get_many::<String>(id)?
            .map(|s| Value::from(s.clone()))
            .collect(),
        ValueKind::List(_) => return None,
    };
    Some(Value::Array(items))
}

#[cfg(test)]
mod tests {
    use argspec_core::{FieldSpec, Schema};
    use serde_json::json;

    use super::*;

    fn sample_schema() -> Schema {
        Schema::new("ingest")
            .with_description("Ingest a data feed")
            .with_field(
                FieldSpec::required("threshold", ValueKind::Float)
                    .with_description("Trigger level"),
            )
            .with_field(FieldSpec::with_default("max_retries", ValueKind::Integer, json!(3)))
            .with_field(FieldSpec::with_default("dry_run", ValueKind::Bool, json!(false)))
            .with_field(FieldSpec::optional("tag", ValueKind::String))
            .with_field(FieldSpec::with_default(
                "format",
                ValueKind::Choice(vec!["json".into(), "yaml".into()]),
                json!("json"),
            ))
            .with_field(FieldSpec::with_default(
                "points",
                ValueKind::List(Box::new(ValueKind::Integer)),
                json!([]),
            ))
    }

    fn find_arg<'a>(command: &'a Command, id: &str) -> &'a Arg {
        command
            .get_arguments()
            .find(|a| a.get_id() == id)
            .unwrap_or_else(|| panic!("no arg with id {id}"))
    }

    #[test]
    fn test_flags_are_hyphenated() {
        let command = build_command(&sample_schema(), None);

        assert_eq!(find_arg(&command, "max_retries").get_long(), Some("max-retries"));
        assert_eq!(find_arg(&command, "dry_run").get_long(), Some("dry-run"));
    }

    #[test]
    fn test_required_depends_on_schema_without_config() {
        let command = build_command(&sample_schema(), None);

        assert!(find_arg(&command, "threshold").is_required_set());
        assert!(!find_arg(&command, "max_retries").is_required_set());
        assert!(!find_arg(&command, "tag").is_required_set());
    }

    #[test]
    fn test_config_value_lifts_requiredness() {
        let config = json!({ "threshold": 0.5 }).as_object().cloned().unwrap();
        let command = build_command(&sample_schema(), Some(&config));

        assert!(!find_arg(&command, "threshold").is_required_set());
    }

    #[test]
    fn test_null_config_value_does_not_lift_requiredness() {
        let config = json!({ "threshold": null }).as_object().cloned().unwrap();
        let command = build_command(&sample_schema(), Some(&config));

        assert!(find_arg(&command, "threshold").is_required_set());
    }

    #[test]
    fn test_defaults_are_rendered_for_help() {
        let command = build_command(&sample_schema(), None);

        let defaults: Vec<String> = find_arg(&command, "max_retries")
            .get_default_values()
            .iter()
            .map(|v| v.to_string_lossy().into_owned())
            .collect();
        assert_eq!(defaults, vec!["3"]);

        // Null defaults contribute no clap default
        assert!(find_arg(&command, "tag").get_default_values().is_empty());
    }

    #[test]
    fn test_parse_and_extract_explicit() {
        let schema = sample_schema();
        let matches = build_command(&schema, None)
            .try_get_matches_from(["ingest", "--threshold", "0.5", "--dry-run", "yes"])
            .unwrap();

        let explicit = extract_explicit(&schema, &matches);
        assert_eq!(explicit.get("threshold"), Some(&json!(0.5)));
        assert_eq!(explicit.get("dry_run"), Some(&json!(true)));
        assert!(!explicit.contains_key("max_retries"));
        assert!(!explicit.contains_key("format"));
    }

    #[test]
    fn test_integer_flags_reject_non_numeric_values() {
        let result = build_command(&sample_schema(), None)
            .try_get_matches_from(["ingest", "--threshold", "1.0", "--max-retries", "abc"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_choice_values_are_enforced() {
        let result = build_command(&sample_schema(), None)
            .try_get_matches_from(["ingest", "--threshold", "1.0", "--format", "toml"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_list_flags_append() {
        let schema = sample_schema();
        let matches = build_command(&schema, None)
            .try_get_matches_from([
                "ingest", "--threshold", "1.0", "--points", "1", "--points", "2",
            ])
            .unwrap();

        let explicit = extract_explicit(&schema, &matches);
        assert_eq!(explicit.get("points"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_unknown_flags_are_rejected() {
        let result = build_command(&sample_schema(), None)
            .try_get_matches_from(["ingest", "--threshold", "1.0", "--bogus", "x"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_error_names_the_flag() {
        let error = build_command(&sample_schema(), None)
            .try_get_matches_from(["ingest"])
            .unwrap_err();

        assert!(error.to_string().contains("--threshold"));
    }

    #[test]
    fn test_help_lists_fields_and_descriptions() {
        let mut command = build_command(&sample_schema(), None);
        let help = command.render_help().to_string();

        assert!(help.contains("--threshold"));
        assert!(help.contains("Trigger level"));
        assert!(help.contains("--max-retries"));
        assert!(help.contains("--config"));
        assert!(help.contains("Ingest a data feed"));
    }
}
