use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Validated argument object handed to a target function.
///
/// An `ArgumentSet` is only produced by
/// [`validate_arguments`](crate::validate_arguments), so holding one means
/// the values already passed full validation: every schema field is present,
/// required fields are non-null, and every value matches its declared kind.
/// The typed getters read individual fields;
/// [`into_typed`](ArgumentSet::into_typed) converts the whole set into the
/// caller's own argument struct via serde.
///
/// # Examples
///
/// ```
/// use argspec_core::*;
/// use serde_json::json;
///
/// let schema = Schema::new("ingest")
///     .with_field(FieldSpec::required("threshold", ValueKind::Float))
///     .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)));
///
/// let mapping = json!({ "threshold": 0.5, "count": 3 }).as_object().unwrap().clone();
/// let args = validate_arguments(&schema, mapping).unwrap();
///
/// assert_eq!(args.get_f64("threshold"), Some(0.5));
/// assert_eq!(args.get_i64("count"), Some(3));
/// assert!(args.get("missing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ArgumentSet {
    values: Map<String, Value>,
}

impl ArgumentSet {
    /// Construction is reserved for validation so an `ArgumentSet` always
    /// holds checked values.
    pub(crate) fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Gets the raw value for a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Gets a boolean field.
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.values.get(field).and_then(Value::as_bool)
    }

    /// Gets an integer field.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.values.get(field).and_then(Value::as_i64)
    }

    /// Gets a float field. Integer values widen.
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.values.get(field).and_then(Value::as_f64)
    }

    /// Gets a string field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(Value::as_str)
    }

    /// Gets a list field as a value slice.
    pub fn get_list(&self, field: &str) -> Option<&Vec<Value>> {
        self.values.get(field).and_then(Value::as_array)
    }

    /// Whether the set holds a value for this field.
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Number of fields in the set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over field names and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Converts the set into the caller's typed argument struct.
    ///
    /// This is the hand-off point to the target function: the validated
    /// mapping is deserialized into any `T: DeserializeOwned`, typically a
    /// `#[derive(Deserialize)]` struct whose fields mirror the schema.
    ///
    /// # Errors
    ///
    /// Returns the serde error when `T`'s shape does not line up with the
    /// schema (wrong field name, narrower type, missing `Option` for a
    /// nullable field).
    ///
    /// # Examples
    ///
    /// ```
    /// use argspec_core::*;
    /// use serde::Deserialize;
    /// use serde_json::json;
    ///
    /// #[derive(Deserialize)]
    /// struct Ingest {
    ///     threshold: f64,
    ///     count: i64,
    /// }
    ///
    /// let schema = Schema::new("ingest")
    ///     .with_field(FieldSpec::required("threshold", ValueKind::Float))
    ///     .with_field(FieldSpec::with_default("count", ValueKind::Integer, json!(1)));
    ///
    /// let mapping = json!({ "threshold": 0.5 }).as_object().unwrap().clone();
    /// let args = validate_arguments(&schema, mapping).unwrap();
    ///
    /// let ingest: Ingest = args.into_typed().unwrap();
    /// assert_eq!(ingest.threshold, 0.5);
    /// assert_eq!(ingest.count, 1);
    /// ```
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.values))
    }

    /// Consumes the set, returning the underlying mapping.
    pub fn into_inner(self) -> Map<String, Value> {
        self.values
    }
}
