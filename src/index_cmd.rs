//! `msearch schema` and `msearch init`.

use anyhow::Result;
use model_search_core::{build_schema, SearchAdapter};
use std::sync::Arc;

use crate::backend;
use crate::config::Config;
use crate::models::demo_registry;

/// Print the schema the index would be created with.
pub fn run_schema() -> Result<()> {
    let registry = demo_registry()?;
    let schema = build_schema(registry.participating());
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Drop and recreate the configured index.
pub async fn run_init(config: &Config) -> Result<()> {
    let registry = Arc::new(demo_registry()?);
    let client = backend::connect_index(config).await?;
    let index = config.index_name();
    let adapter = SearchAdapter::start(registry, client, index.as_str()).await?;

    println!("init {}", index);
    for (type_name, mapping) in adapter.schema().types() {
        println!("  {}: {} fields", type_name, mapping.properties().len());
    }
    println!("ok");

    adapter.shutdown().await?;
    Ok(())
}
