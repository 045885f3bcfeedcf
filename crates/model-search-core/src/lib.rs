//! # Model Search Core
//!
//! The mapping layer between a typed object model and a document search
//! index: model metadata, index schema derivation, document serialization,
//! change-event routing, and materialization of search hits back into
//! typed objects.
//!
//! This crate contains no tokio, sqlx, HTTP, or filesystem I/O. Index
//! backends plug in through the [`index::IndexClient`] trait; an in-memory
//! implementation ships in [`index::memory`].
//!
//! ## Data Flow
//!
//! ```text
//! object store ──event──▶ ChangeRouter ──Document──▶ IndexClient
//!                              │                        │
//!                        ModelRegistry ◀── hits ── search query
//!                              │
//!                        materialize ──▶ Vec<T>
//! ```

pub mod adapter;
pub mod error;
pub mod index;
pub mod mapping;
pub mod materialize;
pub mod models;
pub mod router;
pub mod schema;
pub mod search;
pub mod serialize;
pub mod slug;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::SearchAdapter;
pub use error::{FieldError, MetadataError, SearchError};
pub use index::{IndexClient, RawHit, SearchQuery, SearchResponse};
pub use mapping::{build_schema, IndexSchema};
pub use models::{Document, FieldDescriptor, FieldOptions, FieldType, IndexHint, Scalar};
pub use router::{ChangeRouter, EventKind, LifecycleEvent, RouteOutcome};
pub use schema::{ModelDescriptor, ModelRegistry, ModelType};
pub use search::SearchResult;
