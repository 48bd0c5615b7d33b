use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use argspec_core::{FieldSpec, Schema, relax_schema, validate_mapping, validate_schema};
use argspec_dispatch::{DispatchError, decode_config_file, parse_from};

/// Output format for the inspect subcommand.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum InspectFormat {
    Table,
    Json,
    Yaml,
}

/// Output format for validated argument sets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argspec")]
#[command(version)]
#[command(about = "Inspect and run schema-driven argument surfaces")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the flag surface a schema file generates.
    Inspect(InspectArgs),
    /// Validate a config file against a schema file.
    Check(CheckArgs),
    /// Run the full two-pass parse over trailing arguments.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Schema file (.json, .yaml, or .yml).
    #[arg(long)]
    schema: PathBuf,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: InspectFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file (.json, .yaml, or .yml).
    #[arg(long)]
    schema: PathBuf,
    /// Config file to validate (.toml, .yaml, .yml, or .json).
    #[arg(long)]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Schema file (.json, .yaml, or .yml).
    #[arg(long)]
    schema: PathBuf,
    /// Output format for the validated arguments.
    #[arg(long, default_value = "json")]
    output: OutputFormat,
    /// Arguments for the generated surface, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init();

    let result = match cli.command {
        Command::Inspect(args) => run_inspect(args),
        Command::Check(args) => run_check(args),
        Command::Run(args) => run_run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let schema = load_schema(&args.schema)?;

    let rendered = match args.format {
        InspectFormat::Table => surface_table(&schema),
        InspectFormat::Json => serde_json::to_string_pretty(&schema)
            .map_err(|e| format!("JSON serialization failed: {e}"))?,
        InspectFormat::Yaml => serde_yaml::to_string(&schema)
            .map_err(|e| format!("YAML serialization failed: {e}"))?,
    };

    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let schema = load_schema(&args.schema)?;
    let config = decode_config_file(&args.config).map_err(|e| e.to_string())?;

    let relaxed = relax_schema(&schema);
    let issues = validate_mapping(&relaxed, &config);
    if !issues.is_empty() {
        let mut out = format!(
            "config file {} has {} issue(s):",
            args.config.display(),
            issues.len()
        );
        for issue in &issues {
            out.push_str(&format!("\n  {issue}"));
        }
        return Err(out);
    }

    println!(
        "config file {} is valid for schema {}",
        args.config.display(),
        schema.name
    );
    for field in &schema.fields {
        if let Some(value) = config.get(&field.name) {
            if !value.is_null() {
                println!("  {} = {value}", field.name);
            }
        }
    }
    Ok(())
}

fn run_run(args: RunArgs) -> Result<(), String> {
    let schema = load_schema(&args.schema)?;

    let mut argv = vec![schema.name.clone()];
    argv.extend(args.args);

    let parsed = match parse_from(&schema, &argv) {
        Ok(parsed) => parsed,
        // Usage errors (including --help on the generated surface) keep
        // clap's rendering and exit convention.
        Err(err @ DispatchError::Usage(_)) => err.exit(),
        Err(err) => return Err(err.to_string()),
    };

    let rendered = match args.output {
        OutputFormat::Json => serde_json::to_string_pretty(&parsed)
            .map_err(|e| format!("JSON serialization failed: {e}"))?,
        OutputFormat::Yaml => serde_yaml::to_string(&parsed)
            .map_err(|e| format!("YAML serialization failed: {e}"))?,
    };

    println!("{}", rendered.trim_end());
    Ok(())
}

fn load_schema(path: &Path) -> Result<Schema, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read schema file {}: {e}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let schema: Schema = match extension.as_str() {
        "json" => serde_json::from_str(&content)
            .map_err(|e| format!("cannot parse schema file {}: {e}", path.display()))?,
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .map_err(|e| format!("cannot parse schema file {}: {e}", path.display()))?,
        other => {
            return Err(format!(
                "unrecognized schema extension .{other} for {} (expected .json, .yaml, or .yml)",
                path.display()
            ));
        }
    };

    let defects = validate_schema(&schema);
    if !defects.is_empty() {
        let mut out = format!("schema file {} is invalid:", path.display());
        for defect in &defects {
            out.push_str(&format!("\n  {defect}"));
        }
        return Err(out);
    }

    Ok(schema)
}

fn surface_table(schema: &Schema) -> String {
    let mut out = String::new();

    out.push_str(&format!("Command: {}\n", schema.name));
    if let Some(ref desc) = schema.description {
        out.push_str(&format!("  {desc}\n"));
    }

    out.push_str("\nFlags:\n");
    let rows: Vec<[String; 4]> = schema
        .fields
        .iter()
        .map(field_row)
        .chain(std::iter::once([
            "--config".to_string(),
            "path".to_string(),
            "optional".to_string(),
            "Read argument values from a TOML/YAML/JSON file".to_string(),
        ]))
        .collect();

    let flag_width = rows.iter().map(|r| r[0].len()).max().unwrap_or(4);
    let kind_width = rows.iter().map(|r| r[1].len()).max().unwrap_or(4);
    let need_width = rows.iter().map(|r| r[2].len()).max().unwrap_or(4);

    for [flag, kind, need, desc] in &rows {
        out.push_str(
            format!("  {flag:<flag_width$}  {kind:<kind_width$}  {need:<need_width$}  {desc}")
                .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn field_row(field: &FieldSpec) -> [String; 4] {
    let need = match &field.default {
        None => "required".to_string(),
        Some(default) if default.is_null() => "optional".to_string(),
        Some(default) => format!("default: {default}"),
    };

    [
        format!("--{}", field.flag_name()),
        field.kind.to_string(),
        need,
        field.description.clone().unwrap_or_default(),
    ]
}
