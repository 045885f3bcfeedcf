//! Error types for the mapping layer.
//!
//! Which errors reach the caller is decided per path: index writes skip
//! and log, deletes and startup propagate, and materialization fails the
//! whole result set.

use thiserror::Error;

use crate::models::{FieldType, Scalar};

/// Invalid model metadata, detected when types are registered.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("model `{0}` is searchable but exposes no participating fields")]
    NoFields(String),

    #[error("model name `{0}` does not produce a usable type name")]
    InvalidTypeName(String),

    #[error("model `{0}` has no key accessor")]
    MissingKey(String),

    #[error("model `{model}` declares field `{field}` more than once")]
    DuplicateField { model: String, field: String },

    #[error("model `{0}` is registered more than once")]
    AlreadyRegistered(String),

    #[error("type name `{type_name}` is claimed by both `{first}` and `{second}`")]
    DuplicateTypeName {
        type_name: String,
        first: String,
        second: String,
    },
}

/// A failure reading, assigning, or constructing a single value.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("expected {expected} value, found {found}")]
    Mismatch {
        expected: FieldType,
        found: &'static str,
    },

    #[error("invalid value: {0}")]
    Invalid(String),

    #[error("field is not readable: {0}")]
    Unreadable(String),

    #[error("cannot construct instance: {0}")]
    Construct(String),
}

impl FieldError {
    pub(crate) fn mismatch(expected: FieldType, found: &Scalar) -> Self {
        Self::Mismatch {
            expected,
            found: found.kind(),
        }
    }
}

/// Errors surfaced by the adapter.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// The index could not be (re)created; the adapter must not start.
    #[error("failed to recreate index `{index}`")]
    Startup {
        index: String,
        #[source]
        source: anyhow::Error,
    },

    /// One object could not be serialized; the event is skipped.
    #[error("failed to serialize field `{field}` of `{model}`")]
    Serialization {
        model: String,
        field: String,
        #[source]
        source: FieldError,
    },

    #[error("failed to delete `{type_name}/{id}` from index `{index}`")]
    Delete {
        index: String,
        type_name: String,
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// A hit could not be turned into an instance; the result set is lost.
    #[error("failed to materialize `{model}` from search hit `{hit}`")]
    Materialization {
        model: String,
        hit: String,
        #[source]
        source: FieldError,
    },

    #[error("search against `{index}/{type_name}` failed")]
    Search {
        index: String,
        type_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("model `{0}` is not registered")]
    UnknownModel(String),

    #[error("model `{0}` is not searchable")]
    NotSearchable(String),

    #[error("failed to close index client")]
    Shutdown(#[source] anyhow::Error),
}
