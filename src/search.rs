//! `msearch search`: query one model type and print the materialized hits.
//!
//! Attaches to an existing index; it never recreates it.

use anyhow::{bail, Result};
use model_search_core::search::search_model;
use model_search_core::{IndexClient, ModelRegistry, SearchQuery, SearchResult};
use serde::Serialize;
use std::sync::Arc;

use crate::backend;
use crate::config::Config;
use crate::models::{demo_registry, Article, Author};

pub async fn run_search(
    config: &Config,
    model: &str,
    query: &str,
    from: usize,
    size: usize,
) -> Result<()> {
    let registry = demo_registry()?;
    let client = backend::connect_index(config).await?;
    let index = config.index_name();

    if !client.index_exists(&index).await? {
        bail!(
            "Index '{}' does not exist. Run `msearch init` or `msearch replay` first.",
            index
        );
    }

    let query = SearchQuery::new(query).page(from, size);
    match model {
        "Article" | "article" => {
            let result = search_as::<Article>(&client, &registry, &index, &query).await?;
            print_hits("article", &result)?;
        }
        "Author" | "author" => {
            let result = search_as::<Author>(&client, &registry, &index, &query).await?;
            print_hits("author", &result)?;
        }
        other => {
            let known = registry.iter().any(|m| m.name() == other);
            if known {
                bail!("Model '{}' is not searchable", other);
            }
            bail!("Unknown model type: '{}'. Searchable: Article, Author", other);
        }
    }

    client.close().await?;
    Ok(())
}

async fn search_as<T: Send + Sync + 'static>(
    client: &Arc<dyn IndexClient>,
    registry: &ModelRegistry,
    index: &str,
    query: &SearchQuery,
) -> Result<SearchResult<T>> {
    Ok(search_model::<T>(client.as_ref(), registry, index, query).await?)
}

fn print_hits<T: Serialize>(type_name: &str, result: &SearchResult<T>) -> Result<()> {
    if result.is_empty() {
        println!("No results.");
        return Ok(());
    }
    println!("{}: {} of {} hits", type_name, result.len(), result.total);
    for (i, hit) in result.hits.iter().enumerate() {
        println!("  {}. {}", i + 1, serde_json::to_string(hit)?);
    }
    Ok(())
}
