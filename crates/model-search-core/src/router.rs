//! Change routing: object store lifecycle events → index writes.
//!
//! | Event | Searchable type | Index call | On failure |
//! |-------|-----------------|------------|------------|
//! | `Persisted` / `Updated` | yes | upsert by id | logged, not retried |
//! | `Deleted` | yes | delete by id | returned to the caller |
//! | any | no | none | n/a |
//! | `Other(_)` | n/a | none | n/a |
//!
//! Events are handled one at a time on the caller's task and every index
//! call is awaited before [`ChangeRouter::on_event`] returns, so a caller
//! that awaits each event in order never has a later write for a key
//! overtaken by an earlier one. There is no per-key locking across tasks.

use std::any::Any;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::SearchError;
use crate::index::IndexClient;
use crate::schema::{ModelDescriptor, ModelRegistry};

/// Kind of lifecycle notification delivered by the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Persisted,
    Updated,
    Deleted,
    /// Any notification the router does not handle. Logged and ignored.
    Other(String),
}

/// A lifecycle notification for one object instance.
pub struct LifecycleEvent<'a> {
    pub kind: EventKind,
    pub instance: &'a (dyn Any + Send + Sync),
}

impl<'a> LifecycleEvent<'a> {
    pub fn new(kind: EventKind, instance: &'a (dyn Any + Send + Sync)) -> Self {
        Self { kind, instance }
    }

    pub fn persisted(instance: &'a (dyn Any + Send + Sync)) -> Self {
        Self::new(EventKind::Persisted, instance)
    }

    pub fn updated(instance: &'a (dyn Any + Send + Sync)) -> Self {
        Self::new(EventKind::Updated, instance)
    }

    pub fn deleted(instance: &'a (dyn Any + Send + Sync)) -> Self {
        Self::new(EventKind::Deleted, instance)
    }
}

/// What the router did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Indexed,
    Removed,
    /// The instance's type is unregistered or not searchable.
    NotSearchable,
    /// A field could not be read; nothing was written.
    SerializationSkipped,
    /// The index rejected the upsert; the event is dropped.
    UpsertFailed,
    Ignored,
}

/// Dispatches lifecycle events to an [`IndexClient`].
pub struct ChangeRouter {
    registry: Arc<ModelRegistry>,
    client: Arc<dyn IndexClient>,
    index: String,
}

impl ChangeRouter {
    pub fn new(
        registry: Arc<ModelRegistry>,
        client: Arc<dyn IndexClient>,
        index: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            client,
            index: index.into(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Handle one event to completion.
    ///
    /// Only a failed delete is returned as an error; every other failure
    /// is logged and reported through the [`RouteOutcome`].
    pub async fn on_event(&self, event: LifecycleEvent<'_>) -> Result<RouteOutcome, SearchError> {
        match event.kind {
            EventKind::Persisted | EventKind::Updated => Ok(self.index(event.instance).await),
            EventKind::Deleted => self.unindex(event.instance).await,
            EventKind::Other(kind) => {
                debug!(kind = %kind, "ignoring unrecognized lifecycle event");
                Ok(RouteOutcome::Ignored)
            }
        }
    }

    fn searchable_model(&self, instance: &(dyn Any + Send + Sync)) -> Option<&dyn ModelDescriptor> {
        let type_id = (*instance).type_id();
        if !self.registry.is_participating_type(type_id) {
            return None;
        }
        self.registry.lookup(type_id)
    }

    async fn index(&self, instance: &(dyn Any + Send + Sync)) -> RouteOutcome {
        let Some(model) = self.searchable_model(instance) else {
            return RouteOutcome::NotSearchable;
        };
        let Some(key) = model.key_of(instance) else {
            return RouteOutcome::NotSearchable;
        };
        let document = match model.serialize_any(instance) {
            Some(Ok(document)) => document,
            Some(Err(e)) => {
                warn!(model = model.name(), id = %key, error = %e, "skipping object that failed to serialize");
                return RouteOutcome::SerializationSkipped;
            }
            None => return RouteOutcome::NotSearchable,
        };

        info!(model = model.name(), id = %key, "indexing");
        match self
            .client
            .upsert(&self.index, model.type_name(), &key, &document)
            .await
        {
            Ok(()) => RouteOutcome::Indexed,
            Err(e) => {
                warn!(model = model.name(), id = %key, error = format!("{e:#}"), "failed to index object");
                RouteOutcome::UpsertFailed
            }
        }
    }

    async fn unindex(&self, instance: &(dyn Any + Send + Sync)) -> Result<RouteOutcome, SearchError> {
        let Some(model) = self.searchable_model(instance) else {
            return Ok(RouteOutcome::NotSearchable);
        };
        let Some(key) = model.key_of(instance) else {
            return Ok(RouteOutcome::NotSearchable);
        };

        info!(model = model.name(), id = %key, "unindexing");
        self.client
            .delete(&self.index, model.type_name(), &key)
            .await
            .map_err(|source| SearchError::Delete {
                index: self.index.clone(),
                type_name: model.type_name().to_string(),
                id: key.clone(),
                source,
            })?;
        Ok(RouteOutcome::Removed)
    }
}
