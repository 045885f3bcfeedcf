//! Typed search: run a query against one model's type and materialize the
//! hits.

use serde::Serialize;

use crate::error::SearchError;
use crate::index::{IndexClient, SearchQuery};
use crate::materialize::materialize;
use crate::schema::ModelRegistry;

/// A page of typed hits plus the total number of matches in the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<T> {
    pub hits: Vec<T>,
    pub total: u64,
}

impl<T> SearchResult<T> {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Query `index` for documents of `T`'s type and materialize them.
///
/// `T` must be registered and searchable.
pub async fn search_model<T: Send + Sync + 'static>(
    client: &dyn IndexClient,
    registry: &ModelRegistry,
    index: &str,
    query: &SearchQuery,
) -> Result<SearchResult<T>, SearchError> {
    let model = registry
        .model::<T>()
        .ok_or_else(|| SearchError::UnknownModel(std::any::type_name::<T>().to_string()))?;
    if !registry.is_participating::<T>() {
        return Err(SearchError::NotSearchable(model.name().to_string()));
    }

    let response = client
        .search(index, model.type_name(), query)
        .await
        .map_err(|source| SearchError::Search {
            index: index.to_string(),
            type_name: model.type_name().to_string(),
            source,
        })?;

    Ok(SearchResult {
        hits: materialize(model, &response.hits)?,
        total: response.total,
    })
}
