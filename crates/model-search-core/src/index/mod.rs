//! Index client abstraction.
//!
//! The [`IndexClient`] trait is the narrow surface the adapter needs from a
//! search engine, enabling pluggable backends (HTTP, SQLite, in-memory).
//!
//! Implementations must be `Send + Sync` to work with async runtimes. The
//! adapter awaits every call before moving to the next event, so backends
//! never see overlapping writes from one caller.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::mapping::IndexSchema;
use crate::models::{Document, Scalar};

/// A free-text query with paging.
///
/// The query string is passed to the backend verbatim; an empty string or
/// `*` matches every document of the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub from: usize,
    #[serde(default = "default_size")]
    pub size: usize,
}

fn default_size() -> usize {
    10
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            from: 0,
            size: default_size(),
        }
    }

    pub fn all() -> Self {
        Self::new("*")
    }

    pub fn page(mut self, from: usize, size: usize) -> Self {
        self.from = from;
        self.size = size;
        self
    }

    /// Lowercased search terms; empty when the query matches everything.
    pub fn terms(&self) -> Vec<String> {
        let q = self.query.trim();
        if q.is_empty() || q == "*" {
            return Vec::new();
        }
        q.to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Number of `terms` found (case-insensitively) in the text values of
/// `document`. Backends without a real analyzer rank hits by this.
pub fn keyword_score(document: &Document, terms: &[String]) -> usize {
    terms
        .iter()
        .filter(|term| {
            document.iter().any(|(_, value)| match value {
                Scalar::Text(text) => text.to_lowercase().contains(term.as_str()),
                _ => false,
            })
        })
        .count()
}

/// One raw hit as returned by the index.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub id: String,
    pub score: Option<f64>,
    pub source: Document,
}

/// A page of raw hits plus the backend's total match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub hits: Vec<RawHit>,
    pub total: u64,
}

/// Abstract search index backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`index_exists`](IndexClient::index_exists) | Check whether an index exists |
/// | [`delete_index`](IndexClient::delete_index) | Drop an index and all its documents |
/// | [`create_index`](IndexClient::create_index) | Create an index with a schema |
/// | [`upsert`](IndexClient::upsert) | Write a document, replacing any at the same id |
/// | [`delete`](IndexClient::delete) | Remove a document by id |
/// | [`search`](IndexClient::search) | Run a query against one type |
/// | [`close`](IndexClient::close) | Release client resources |
#[async_trait]
pub trait IndexClient: Send + Sync {
    async fn index_exists(&self, index: &str) -> Result<bool>;

    async fn delete_index(&self, index: &str) -> Result<()>;

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()>;

    /// Index `document` under `id`, overwriting any previous document.
    async fn upsert(
        &self,
        index: &str,
        type_name: &str,
        id: &str,
        document: &Document,
    ) -> Result<()>;

    /// Remove the document at `id`. Removing an absent id is not an error.
    async fn delete(&self, index: &str, type_name: &str, id: &str) -> Result<()>;

    async fn search(
        &self,
        index: &str,
        type_name: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
