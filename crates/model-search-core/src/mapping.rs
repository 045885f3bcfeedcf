//! Index schema derivation.
//!
//! Turns the field descriptors of every participating model into the
//! schema document the index is created with:
//!
//! ```json
//! { "article": { "properties": {
//!     "title":    { "type": "multi_field" },
//!     "views":    { "type": "long" },
//!     "authorId": { "type": "string" },
//!     "tag":      { "type": "string", "index": "not_analyzed" }
//! } } }
//! ```
//!
//! Type selection, first match wins:
//!
//! | Field | Index type |
//! |-------|------------|
//! | multi-field (≥ 2 encodings) | `multi_field` |
//! | non-relation [`FieldType::Integer`] | `integer` |
//! | non-relation [`FieldType::Long`] | `long` |
//! | everything else (relations, text, dates, bools, floats) | `string` |
//!
//! Everything that is not an integer collapses to `string`; existing
//! indices depend on these names, so new field types must not change them.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use tracing::info;

use crate::error::SearchError;
use crate::index::IndexClient;
use crate::models::{FieldDescriptor, FieldType, IndexHint};
use crate::schema::ModelDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    MultiField,
    Integer,
    Long,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOption {
    NotAnalyzed,
}

/// Mapping of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    #[serde(rename = "type")]
    pub index_type: IndexType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexOption>,
}

/// Mapping of one model type: its fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMapping {
    properties: Vec<(String, FieldMapping)>,
}

impl TypeMapping {
    pub fn properties(&self) -> &[(String, FieldMapping)] {
        &self.properties
    }

    pub fn get(&self, field: &str) -> Option<&FieldMapping> {
        self.properties
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, m)| m)
    }
}

/// The full schema an index is created with, keyed by type name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSchema {
    types: Vec<(String, TypeMapping)>,
}

impl IndexSchema {
    pub fn types(&self) -> &[(String, TypeMapping)] {
        &self.types
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeMapping> {
        self.types
            .iter()
            .find(|(name, _)| name == type_name)
            .map(|(_, m)| m)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

struct Ordered<'a, V>(&'a [(String, V)]);

impl<V: Serialize> Serialize for Ordered<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for TypeMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TypeMapping", 1)?;
        s.serialize_field("properties", &Ordered(&self.properties))?;
        s.end()
    }
}

impl Serialize for IndexSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Ordered(&self.types).serialize(serializer)
    }
}

pub fn index_type(field: &FieldDescriptor) -> IndexType {
    if field.is_multi_field {
        return IndexType::MultiField;
    }
    match (field.is_relation, field.field_type) {
        (false, FieldType::Integer) => IndexType::Integer,
        (false, FieldType::Long) => IndexType::Long,
        _ => IndexType::String,
    }
}

/// Only an exact-match hint changes the mapping; other hints are accepted
/// and produce no option.
pub fn index_option(field: &FieldDescriptor) -> Option<IndexOption> {
    match field.index_hint {
        Some(IndexHint::NotAnalyzed) => Some(IndexOption::NotAnalyzed),
        Some(IndexHint::Analyzed | IndexHint::No) | None => None,
    }
}

pub fn field_mapping(field: &FieldDescriptor) -> FieldMapping {
    FieldMapping {
        index_type: index_type(field),
        index: index_option(field),
    }
}

pub fn type_mapping(model: &dyn ModelDescriptor) -> TypeMapping {
    TypeMapping {
        properties: model
            .fields()
            .iter()
            .map(|f| (f.name.clone(), field_mapping(f)))
            .collect(),
    }
}

/// Build the schema for the given models, in the order given.
pub fn build_schema<'a>(models: impl IntoIterator<Item = &'a dyn ModelDescriptor>) -> IndexSchema {
    IndexSchema {
        types: models
            .into_iter()
            .map(|m| (m.type_name().to_string(), type_mapping(m)))
            .collect(),
    }
}

/// Drop and recreate `index` with `schema`.
///
/// Not safe against concurrent writers. Any client failure is returned as
/// [`SearchError::Startup`].
pub async fn recreate_index(
    client: &dyn IndexClient,
    index: &str,
    schema: &IndexSchema,
) -> Result<(), SearchError> {
    let startup = |source: anyhow::Error| SearchError::Startup {
        index: index.to_string(),
        source,
    };

    if client.index_exists(index).await.map_err(startup)? {
        info!(index, "index exists, deleting");
        client.delete_index(index).await.map_err(startup)?;
    }
    client.create_index(index, schema).await.map_err(startup)?;
    info!(index, types = schema.types().len(), "index created");
    Ok(())
}
