//! Core data types shared by the mapping, serialization, and
//! materialization paths.
//!
//! A [`FieldDescriptor`] is the static, per-field metadata of a model type.
//! A [`Document`] is one serialized object: field name to [`Scalar`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// A JSON-compatible scalar carried by a [`Document`].
///
/// `Int` and `Long` are distinct representations of the same JSON number
/// shape. Values decoded from an index response use the narrowest integer
/// that fits, so a 64-bit field written as `Long(7)` comes back as `Int(7)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Decode a JSON value. Returns `None` for null, arrays, and objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(i32::try_from(i).map_or(Self::Long(i), Self::Int)),
                None => n.as_f64().map(Self::Float),
            },
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Short name of the runtime representation, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_i32(self) -> Result<i32, FieldError> {
        match self {
            Self::Int(v) => Ok(v),
            other => Err(FieldError::mismatch(FieldType::Integer, &other)),
        }
    }

    pub fn into_i64(self) -> Result<i64, FieldError> {
        match self {
            Self::Long(v) => Ok(v),
            other => Err(FieldError::mismatch(FieldType::Long, &other)),
        }
    }

    pub fn into_f64(self) -> Result<f64, FieldError> {
        match self {
            Self::Float(v) => Ok(v),
            other => Err(FieldError::mismatch(FieldType::Float, &other)),
        }
    }

    pub fn into_bool(self) -> Result<bool, FieldError> {
        match self {
            Self::Bool(v) => Ok(v),
            other => Err(FieldError::mismatch(FieldType::Bool, &other)),
        }
    }

    pub fn into_string(self) -> Result<String, FieldError> {
        match self {
            Self::Text(v) => Ok(v),
            other => Err(FieldError::mismatch(FieldType::Text, &other)),
        }
    }

    /// Parse an RFC 3339 timestamp written by `From<DateTime<Utc>>`.
    pub fn into_datetime(self) -> Result<DateTime<Utc>, FieldError> {
        let text = match self {
            Self::Text(v) => v,
            other => return Err(FieldError::mismatch(FieldType::Date, &other)),
        };
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| FieldError::Invalid(format!("`{text}` is not an RFC 3339 timestamp: {e}")))
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Text(v.to_rfc3339())
    }
}

/// Declared semantic type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Bounded (32-bit) integer.
    Integer,
    /// 64-bit integer.
    Long,
    Float,
    Bool,
    Text,
    /// Timestamp, carried as RFC 3339 text.
    Date,
    /// Any other scalar, carried as text.
    Other,
}

impl FieldType {
    /// Whether `value` is already in this type's runtime representation.
    pub fn accepts(self, value: &Scalar) -> bool {
        matches!(
            (self, value),
            (Self::Integer, Scalar::Int(_))
                | (Self::Long, Scalar::Long(_))
                | (Self::Float, Scalar::Float(_))
                | (Self::Bool, Scalar::Bool(_))
                | (Self::Text | Self::Date | Self::Other, Scalar::Text(_))
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Text => "text",
            Self::Date => "date",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit index behavior requested for a field or one of its encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexHint {
    /// Tokenized for full-text search (the index default).
    Analyzed,
    /// Stored verbatim for exact match and sorting.
    NotAnalyzed,
    /// Not searchable at all.
    No,
}

/// Declarative per-field options attached when a model type is registered.
///
/// ```rust
/// use model_search_core::{FieldOptions, IndexHint};
///
/// let title = FieldOptions::default()
///     .multi_field([IndexHint::Analyzed, IndexHint::NotAnalyzed]);
/// assert!(title.is_multi_field());
///
/// let email = FieldOptions::default().index(IndexHint::NotAnalyzed);
/// assert_eq!(email.index, Some(IndexHint::NotAnalyzed));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOptions {
    /// Transient fields set this to `false` and are invisible to indexing.
    pub participating: bool,
    /// Sub-encodings of a multi-field. Two or more make the field multi-field.
    pub encodings: Vec<IndexHint>,
    pub index: Option<IndexHint>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            participating: true,
            encodings: Vec::new(),
            index: None,
        }
    }
}

impl FieldOptions {
    pub fn transient() -> Self {
        Self {
            participating: false,
            ..Self::default()
        }
    }

    pub fn index(mut self, hint: IndexHint) -> Self {
        self.index = Some(hint);
        self
    }

    pub fn multi_field(mut self, encodings: impl IntoIterator<Item = IndexHint>) -> Self {
        self.encodings = encodings.into_iter().collect();
        self
    }

    pub fn is_multi_field(&self) -> bool {
        self.encodings.len() > 1
    }
}

/// Static metadata for one participating field of a model type.
///
/// Computed once at registration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// Relations always degrade to text in the index schema.
    pub is_relation: bool,
    pub index_hint: Option<IndexHint>,
    pub is_multi_field: bool,
}

/// One serialized object instance: field name to scalar value.
///
/// Absent and null values are never stored; a missing key is the only
/// encoding of "no value".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, Scalar>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Scalar>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), scalar_to_json(v)))
                .collect(),
        )
    }

    /// Decode a document source as returned by an index.
    ///
    /// Nulls, arrays, and nested objects are dropped, matching the write
    /// path which never produces them.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, FieldError> {
        let object = value.as_object().ok_or_else(|| {
            FieldError::Invalid(format!("document source must be an object, got {value}"))
        })?;
        Ok(object
            .iter()
            .filter_map(|(k, v)| Scalar::from_json(v).map(|s| (k.clone(), s)))
            .collect())
    }
}

impl FromIterator<(String, Scalar)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn scalar_to_json(value: &Scalar) -> serde_json::Value {
    match value {
        Scalar::Bool(b) => serde_json::Value::Bool(*b),
        Scalar::Int(i) => serde_json::Value::from(*i),
        Scalar::Long(i) => serde_json::Value::from(*i),
        Scalar::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Scalar::Text(s) => serde_json::Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_picks_narrowest_integer() {
        assert_eq!(Scalar::from_json(&json!(42)), Some(Scalar::Int(42)));
        assert_eq!(
            Scalar::from_json(&json!(5_000_000_000i64)),
            Some(Scalar::Long(5_000_000_000))
        );
        assert_eq!(Scalar::from_json(&json!(1.5)), Some(Scalar::Float(1.5)));
        assert_eq!(Scalar::from_json(&json!(null)), None);
    }

    #[test]
    fn test_long_and_int_share_a_wire_shape() {
        let mut doc = Document::new();
        doc.insert("views", 7i64);
        assert_eq!(doc.to_json(), json!({ "views": 7 }));
        assert_eq!(serde_json::to_value(&doc).unwrap(), json!({ "views": 7 }));

        let decoded = Document::from_json(&doc.to_json()).unwrap();
        assert_eq!(decoded.get("views"), Some(&Scalar::Int(7)));
    }

    #[test]
    fn test_from_json_drops_nulls_and_nested_values() {
        let doc =
            Document::from_json(&json!({ "a": null, "b": [1, 2], "c": { "d": 1 }, "e": "x" }))
                .unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("e"), Some(&Scalar::Text("x".to_string())));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(Document::from_json(&json!([1])).is_err());
    }

    #[test]
    fn test_accepts_exact_representation_only() {
        assert!(FieldType::Long.accepts(&Scalar::Long(1)));
        assert!(!FieldType::Long.accepts(&Scalar::Int(1)));
        assert!(!FieldType::Integer.accepts(&Scalar::Long(1)));
        assert!(FieldType::Date.accepts(&Scalar::Text("2024-01-01T00:00:00Z".into())));
        assert!(!FieldType::Bool.accepts(&Scalar::Text("true".into())));
    }

    #[test]
    fn test_datetime_roundtrip_through_text() {
        let ts = DateTime::parse_from_rfc3339("2024-03-01T12:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let scalar = Scalar::from(ts);
        assert_eq!(scalar.clone().into_datetime().unwrap(), ts);
        assert!(Scalar::Text("yesterday".into()).into_datetime().is_err());
    }

    #[test]
    fn test_multi_field_needs_two_encodings() {
        assert!(!FieldOptions::default()
            .multi_field([IndexHint::Analyzed])
            .is_multi_field());
        assert!(FieldOptions::default()
            .multi_field([IndexHint::Analyzed, IndexHint::NotAnalyzed])
            .is_multi_field());
    }
}
