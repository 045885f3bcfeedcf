//! In-memory [`IndexClient`] implementation for testing and embedding.
//!
//! Uses `HashMap` and `BTreeMap` behind `std::sync::RwLock` for thread
//! safety. Documents are stored as JSON text and decoded on every search,
//! the same trip they take through a real index, so a 64-bit value that
//! fits in 32 bits comes back in the narrow representation.
//!
//! Keyword search counts how many query terms occur (case-insensitively)
//! in a document's text values and ranks by that count.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;

use crate::mapping::IndexSchema;
use crate::models::Document;

use super::{keyword_score, IndexClient, RawHit, SearchQuery, SearchResponse};

struct StoredIndex {
    schema: IndexSchema,
    /// type name → id → JSON source
    types: HashMap<String, BTreeMap<String, String>>,
}

/// In-memory index for tests and single-process setups.
pub struct InMemoryIndex {
    indices: RwLock<HashMap<String, StoredIndex>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            indices: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, StoredIndex>>> {
        self.indices
            .read()
            .map_err(|_| anyhow!("in-memory index lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, StoredIndex>>> {
        self.indices
            .write()
            .map_err(|_| anyhow!("in-memory index lock poisoned"))
    }

    /// Schema the index was created with.
    pub fn schema(&self, index: &str) -> Option<IndexSchema> {
        self.read().ok()?.get(index).map(|s| s.schema.clone())
    }

    /// Stored document, decoded the same way search decodes it.
    pub fn document(&self, index: &str, type_name: &str, id: &str) -> Option<Document> {
        let indices = self.read().ok()?;
        let source = indices.get(index)?.types.get(type_name)?.get(id)?;
        decode(source).ok()
    }

    /// Number of documents of `type_name` in `index`.
    pub fn count(&self, index: &str, type_name: &str) -> usize {
        self.read()
            .ok()
            .and_then(|indices| {
                indices
                    .get(index)
                    .and_then(|s| s.types.get(type_name))
                    .map(BTreeMap::len)
            })
            .unwrap_or(0)
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(source: &str) -> Result<Document> {
    let value: serde_json::Value = serde_json::from_str(source)?;
    Ok(Document::from_json(&value)?)
}

#[async_trait]
impl IndexClient for InMemoryIndex {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(index))
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        if self.write()?.remove(index).is_none() {
            bail!("index `{index}` does not exist");
        }
        Ok(())
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()> {
        let mut indices = self.write()?;
        if indices.contains_key(index) {
            bail!("index `{index}` already exists");
        }
        indices.insert(
            index.to_string(),
            StoredIndex {
                schema: schema.clone(),
                types: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(
        &self,
        index: &str,
        type_name: &str,
        id: &str,
        document: &Document,
    ) -> Result<()> {
        let source = serde_json::to_string(document)?;
        let mut indices = self.write()?;
        let stored = indices
            .get_mut(index)
            .with_context(|| format!("index `{index}` does not exist"))?;
        stored
            .types
            .entry(type_name.to_string())
            .or_default()
            .insert(id.to_string(), source);
        Ok(())
    }

    async fn delete(&self, index: &str, type_name: &str, id: &str) -> Result<()> {
        let mut indices = self.write()?;
        let stored = indices
            .get_mut(index)
            .with_context(|| format!("index `{index}` does not exist"))?;
        if let Some(docs) = stored.types.get_mut(type_name) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        type_name: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse> {
        let indices = self.read()?;
        let stored = indices
            .get(index)
            .with_context(|| format!("index `{index}` does not exist"))?;
        let Some(docs) = stored.types.get(type_name) else {
            return Ok(SearchResponse::default());
        };

        let terms = query.terms();
        let mut scored = Vec::new();
        for (id, source) in docs {
            let document = decode(source)?;
            let score = if terms.is_empty() {
                1.0
            } else {
                keyword_score(&document, &terms) as f64
            };
            if score > 0.0 {
                scored.push(RawHit {
                    id: id.clone(),
                    score: Some(score),
                    source: document,
                });
            }
        }
        // Stable sort keeps id order among equal scores.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total = scored.len() as u64;
        let hits = scored
            .into_iter()
            .skip(query.from)
            .take(query.size)
            .collect();
        Ok(SearchResponse { hits, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scalar;

    fn doc(pairs: &[(&str, Scalar)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    async fn index_with(docs: &[(&str, Document)]) -> InMemoryIndex {
        let index = InMemoryIndex::new();
        index.create_index("app", &IndexSchema::default()).await.unwrap();
        for (id, d) in docs {
            index.upsert("app", "article", id, d).await.unwrap();
        }
        index
    }

    #[tokio::test]
    async fn test_create_and_drop() {
        let index = InMemoryIndex::new();
        assert!(!index.index_exists("app").await.unwrap());
        index.create_index("app", &IndexSchema::default()).await.unwrap();
        assert!(index.index_exists("app").await.unwrap());
        assert!(index.create_index("app", &IndexSchema::default()).await.is_err());
        index.delete_index("app").await.unwrap();
        assert!(!index.index_exists("app").await.unwrap());
        assert!(index.delete_index("app").await.is_err());
    }

    #[tokio::test]
    async fn test_upsert_requires_index() {
        let index = InMemoryIndex::new();
        let result = index.upsert("app", "article", "1", &Document::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let index = index_with(&[
            ("1", doc(&[("title", Scalar::from("first"))])),
            ("1", doc(&[("title", Scalar::from("second"))])),
        ])
        .await;
        assert_eq!(index.count("app", "article"), 1);
        let stored = index.document("app", "article", "1").unwrap();
        assert_eq!(stored.get("title"), Some(&Scalar::from("second")));
    }

    #[tokio::test]
    async fn test_integers_come_back_narrow() {
        let index = index_with(&[("1", doc(&[("views", Scalar::Long(7))]))]).await;
        let stored = index.document("app", "article", "1").unwrap();
        assert_eq!(stored.get("views"), Some(&Scalar::Int(7)));
    }

    #[tokio::test]
    async fn test_delete_absent_id_is_ok() {
        let index = index_with(&[]).await;
        index.delete("app", "article", "404").await.unwrap();
        assert!(index.delete("missing", "article", "1").await.is_err());
    }

    #[tokio::test]
    async fn test_keyword_search_ranks_by_matching_terms() {
        let index = index_with(&[
            ("1", doc(&[("title", Scalar::from("Rust search"))])),
            ("2", doc(&[("title", Scalar::from("Rust"))])),
            ("3", doc(&[("title", Scalar::from("Python"))])),
        ])
        .await;
        let response = index
            .search("app", "article", &SearchQuery::new("rust SEARCH"))
            .await
            .unwrap();
        assert_eq!(response.total, 2);
        let ids: Vec<&str> = response.hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_match_all_with_paging() {
        let index = index_with(&[
            ("1", doc(&[("title", Scalar::from("a"))])),
            ("2", doc(&[("title", Scalar::from("b"))])),
            ("3", doc(&[("title", Scalar::from("c"))])),
        ])
        .await;
        let response = index
            .search("app", "article", &SearchQuery::all().page(1, 1))
            .await
            .unwrap();
        assert_eq!(response.total, 3);
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].id, "2");
    }

    #[tokio::test]
    async fn test_search_unknown_type_is_empty() {
        let index = index_with(&[]).await;
        let response = index
            .search("app", "author", &SearchQuery::all())
            .await
            .unwrap();
        assert!(response.hits.is_empty());
        assert_eq!(response.total, 0);
    }
}
