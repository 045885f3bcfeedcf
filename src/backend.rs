//! Index backend selection.

use anyhow::{Context, Result};
use model_search_core::index::memory::InMemoryIndex;
use model_search_core::IndexClient;
use std::sync::Arc;
use tracing::info;

use crate::config::{Backend, Config};
use crate::http_index::HttpIndex;
use crate::sqlite_index::SqliteIndex;

/// Build the index client named by `[index] backend`.
pub async fn connect_index(config: &Config) -> Result<Arc<dyn IndexClient>> {
    let client: Arc<dyn IndexClient> = match config.index.backend {
        Backend::Memory => Arc::new(InMemoryIndex::new()),
        Backend::Http => {
            let url = config
                .index
                .url
                .as_deref()
                .context("index.url must be specified when backend is 'http'")?;
            Arc::new(HttpIndex::new(url, config.index.timeout_secs)?)
        }
        Backend::Sqlite => {
            let sqlite = config
                .sqlite
                .as_ref()
                .context("[sqlite] path must be specified when backend is 'sqlite'")?;
            Arc::new(SqliteIndex::open(&sqlite.path).await?)
        }
    };
    info!(backend = config.index.backend.as_str(), "index client ready");
    Ok(client)
}
