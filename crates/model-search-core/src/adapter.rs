//! The adapter facade: owns the registry, the index client, and the change
//! router for one index.
//!
//! # Lifecycle
//!
//! 1. [`SearchAdapter::start`] derives the schema from every participating
//!    model and recreates the index with it. Any failure here is fatal.
//! 2. [`SearchAdapter::on_event`] is called for each object store event.
//! 3. [`SearchAdapter::search`] queries one model type at a time.
//! 4. [`SearchAdapter::shutdown`] closes the client.

use std::sync::Arc;

use tracing::info;

use crate::error::SearchError;
use crate::index::{IndexClient, SearchQuery};
use crate::mapping::{build_schema, recreate_index, IndexSchema};
use crate::router::{ChangeRouter, LifecycleEvent, RouteOutcome};
use crate::schema::ModelRegistry;
use crate::search::{search_model, SearchResult};

pub struct SearchAdapter {
    registry: Arc<ModelRegistry>,
    client: Arc<dyn IndexClient>,
    index: String,
    schema: IndexSchema,
    router: ChangeRouter,
}

impl SearchAdapter {
    /// Build the schema and drop-and-recreate `index` with it.
    pub async fn start(
        registry: Arc<ModelRegistry>,
        client: Arc<dyn IndexClient>,
        index: impl Into<String>,
    ) -> Result<Self, SearchError> {
        let index = index.into();
        let schema = build_schema(registry.participating());
        info!(
            index = %index,
            models = registry.len(),
            searchable = schema.types().len(),
            "starting search adapter"
        );
        recreate_index(client.as_ref(), &index, &schema).await?;

        let router = ChangeRouter::new(registry.clone(), client.clone(), index.clone());
        Ok(Self {
            registry,
            client,
            index,
            schema,
            router,
        })
    }

    pub async fn on_event(&self, event: LifecycleEvent<'_>) -> Result<RouteOutcome, SearchError> {
        self.router.on_event(event).await
    }

    pub async fn search<T: Send + Sync + 'static>(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchResult<T>, SearchError> {
        search_model(self.client.as_ref(), &self.registry, &self.index, query).await
    }

    /// The schema the index was created with.
    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    pub fn router(&self) -> &ChangeRouter {
        &self.router
    }

    pub async fn shutdown(self) -> Result<(), SearchError> {
        info!(index = %self.index, "stopping search adapter");
        self.client.close().await.map_err(SearchError::Shutdown)
    }
}
