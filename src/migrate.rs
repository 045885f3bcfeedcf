//! SQLite index tables.
//!
//! - `indices`: one row per index, holding the schema it was created with.
//! - `documents`: one row per `(index, type, id)`, holding the JSON source.
//!
//! Idempotent; safe to run on every connect.

use anyhow::Result;
use sqlx::SqlitePool;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS indices (
            name TEXT PRIMARY KEY,
            schema_json TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            index_name TEXT NOT NULL,
            type_name TEXT NOT NULL,
            id TEXT NOT NULL,
            source_json TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (index_name, type_name, id),
            FOREIGN KEY (index_name) REFERENCES indices(name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_type ON documents(index_name, type_name)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
