//! Config file decoding.
//!
//! Decodes an explicitly named config file into the JSON value model used by
//! the rest of the pipeline. The format is chosen by file extension:
//!
//! - `.toml` — decoded with the [`toml`] crate
//! - `.yaml` / `.yml` / `.json` — decoded with [`serde_yaml`] (JSON is a
//!   YAML subset, so one decoder covers both)
//!
//! Any other extension is a decode error, never an empty result. Decoded
//! trees are converted to [`serde_json::Value`] by explicit recursion so the
//! crate controls strictness: TOML datetimes become their string rendering,
//! while YAML tagged values and non-string mapping keys are rejected.

use std::fs;
use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{DispatchError, Result};

/// Decodes a config file into a field mapping.
///
/// The top level of the document must be a mapping (a TOML table or a
/// YAML/JSON object); its keys are schema field names. Values are carried
/// over without coercion, including explicit `null`s, which later stages
/// treat as "not set".
///
/// # Errors
///
/// Returns [`DispatchError::ConfigNotFound`] when `path` is not an existing
/// file, and [`DispatchError::ConfigParse`] when the file cannot be read,
/// the extension is unrecognized, the content is malformed, or the top level
/// is not a mapping.
///
/// # Examples
///
/// ```no_run
/// use argspec_dispatch::decode_config_file;
///
/// let config = decode_config_file("ingest.toml")?;
/// if let Some(threshold) = config.get("threshold") {
///     println!("threshold from file: {threshold}");
/// }
/// # Ok::<(), argspec_dispatch::DispatchError>(())
/// ```
pub fn decode_config_file(path: impl AsRef<Path>) -> Result<Map<String, Value>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DispatchError::ConfigNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|e| parse_error(path, e.to_string()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let decoded = match extension.as_str() {
        "toml" => {
            let table: toml::Value =
                toml::from_str(&content).map_err(|e| parse_error(path, e.to_string()))?;
            from_toml(table).map_err(|detail| parse_error(path, detail))?
        }
        "yaml" | "yml" | "json" => {
            let doc: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| parse_error(path, e.to_string()))?;
            from_yaml(doc).map_err(|detail| parse_error(path, detail))?
        }
        "" => {
            return Err(parse_error(path, "file has no extension".to_string()));
        }
        other => {
            return Err(parse_error(
                path,
                format!("unrecognized extension .{other} (expected .toml, .yaml, .yml, or .json)"),
            ));
        }
    };

    let Value::Object(mapping) = decoded else {
        return Err(parse_error(
            path,
            "top level must be a mapping of field names to values".to_string(),
        ));
    };

    debug!(
        path = %path.display(),
        format = %extension,
        fields = mapping.len(),
        "decoded config file"
    );
    Ok(mapping)
}

fn parse_error(path: &Path, detail: String) -> DispatchError {
    DispatchError::ConfigParse {
        path: path.to_path_buf(),
        detail,
    }
}

fn from_toml(value: toml::Value) -> std::result::Result<Value, String> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::Number(finite_number(f)?),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(from_toml)
                .collect::<std::result::Result<_, _>>()?,
        ),
        toml::Value::Table(table) => {
            let mut mapping = Map::new();
            for (key, item) in table {
                mapping.insert(key, from_toml(item)?);
            }
            Value::Object(mapping)
        }
    })
}

fn from_yaml(value: serde_yaml::Value) -> std::result::Result<Value, String> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                let f = n.as_f64().ok_or_else(|| "unrepresentable number".to_string())?;
                Value::Number(finite_number(f)?)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<std::result::Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, item) in mapping {
                let serde_yaml::Value::String(key) = key else {
                    return Err("mapping keys must be strings".to_string());
                };
                object.insert(key, from_yaml(item)?);
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => {
            return Err(format!("unsupported tagged value {}", tagged.tag));
        }
    })
}

/// JSON has no rendering for NaN or infinity, so they are decode errors
/// rather than silent nulls.
fn finite_number(f: f64) -> std::result::Result<Number, String> {
    Number::from_f64(f).ok_or_else(|| format!("non-finite number {f} is not supported"))
}
