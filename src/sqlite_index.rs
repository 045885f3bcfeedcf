//! SQLite-backed [`IndexClient`].
//!
//! Documents are stored as JSON text in the `documents` table (see
//! [`crate::migrate`]). Keyword search decodes every document of the type
//! and ranks it with
//! [`keyword_score`](model_search_core::index::keyword_score), the same
//! scoring the in-memory backend uses.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use model_search_core::index::keyword_score;
use model_search_core::{
    Document, IndexClient, IndexSchema, RawHit, SearchQuery, SearchResponse,
};
use sqlx::{Row, SqlitePool};
use std::path::Path;

use crate::db;
use crate::migrate;

pub struct SqliteIndex {
    pool: SqlitePool,
}

impl SqliteIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database at `path` and run migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = db::connect(path)
            .await
            .with_context(|| format!("Failed to open SQLite index at {}", path.display()))?;
        migrate::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn require_index(&self, index: &str) -> Result<()> {
        if !self.index_exists(index).await? {
            bail!("index '{}' does not exist", index);
        }
        Ok(())
    }
}

fn decode(source: &str) -> Result<Document> {
    let value: serde_json::Value = serde_json::from_str(source)?;
    Ok(Document::from_json(&value)?)
}

#[async_trait]
impl IndexClient for SqliteIndex {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM indices WHERE name = ?")
            .bind(index)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM documents WHERE index_name = ?")
            .bind(index)
            .execute(&mut *tx)
            .await?;
        let removed = sqlx::query("DELETE FROM indices WHERE name = ?")
            .bind(index)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            bail!("index '{}' does not exist", index);
        }
        tx.commit().await?;
        Ok(())
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()> {
        if self.index_exists(index).await? {
            bail!("index '{}' already exists", index);
        }
        let schema_json = serde_json::to_string(schema)?;
        sqlx::query("INSERT INTO indices (name, schema_json, created_at) VALUES (?, ?, ?)")
            .bind(index)
            .bind(&schema_json)
            .bind(chrono::Utc::now().timestamp())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert(
        &self,
        index: &str,
        type_name: &str,
        id: &str,
        document: &Document,
    ) -> Result<()> {
        self.require_index(index).await?;
        let source = serde_json::to_string(document)?;
        sqlx::query(
            r#"
            INSERT INTO documents (index_name, type_name, id, source_json, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(index_name, type_name, id) DO UPDATE SET
                source_json = excluded.source_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(index)
        .bind(type_name)
        .bind(id)
        .bind(&source)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, index: &str, type_name: &str, id: &str) -> Result<()> {
        self.require_index(index).await?;
        sqlx::query("DELETE FROM documents WHERE index_name = ? AND type_name = ? AND id = ?")
            .bind(index)
            .bind(type_name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        type_name: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse> {
        self.require_index(index).await?;
        let terms = query.terms();

        // Terms match decoded text values, never the stored JSON text.
        let rows = sqlx::query(
            "SELECT id, source_json FROM documents WHERE index_name = ? AND type_name = ? \
             ORDER BY id",
        )
        .bind(index)
        .bind(type_name)
        .fetch_all(&self.pool)
        .await?;

        let mut scored = Vec::new();
        for row in rows {
            let id: String = row.get("id");
            let source: String = row.get("source_json");
            let document = decode(&source)
                .with_context(|| format!("Corrupt document source for '{}/{}'", type_name, id))?;
            let score = if terms.is_empty() {
                1.0
            } else {
                keyword_score(&document, &terms) as f64
            };
            if score > 0.0 {
                scored.push(RawHit {
                    id,
                    score: Some(score),
                    source: document,
                });
            }
        }
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

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
