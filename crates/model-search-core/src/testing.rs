//! Shared fixtures for unit tests: sample models and a recording index.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::error::FieldError;
use crate::index::memory::InMemoryIndex;
use crate::index::{IndexClient, SearchQuery, SearchResponse};
use crate::mapping::IndexSchema;
use crate::models::{Document, FieldOptions, FieldType, IndexHint, Scalar};
use crate::schema::ModelType;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub id: i64,
    pub title: Option<String>,
    pub views: i64,
    pub author_id: Option<i64>,
    pub rating: Option<i32>,
    pub tag: Option<String>,
    pub draft: Option<String>,
}

pub fn article_type() -> ModelType<Article> {
    ModelType::<Article>::builder("Article")
        .searchable()
        .key(|a| a.id.to_string())
        .field_with(
            "title",
            FieldType::Text,
            FieldOptions::default().multi_field([IndexHint::Analyzed, IndexHint::NotAnalyzed]),
            |a| Ok(a.title.clone().map(Scalar::from)),
            |a, v| {
                a.title = Some(v.into_string()?);
                Ok(())
            },
        )
        .field(
            "views",
            FieldType::Long,
            |a| Ok(Some(Scalar::from(a.views))),
            |a, v| {
                a.views = v.into_i64()?;
                Ok(())
            },
        )
        .relation(
            "authorId",
            |a| Ok(a.author_id.map(|id| Scalar::from(id.to_string()))),
            |a, v| {
                let text = v.into_string()?;
                let id = text
                    .parse()
                    .map_err(|_| FieldError::Invalid(format!("`{text}` is not an author id")))?;
                a.author_id = Some(id);
                Ok(())
            },
        )
        .field(
            "rating",
            FieldType::Integer,
            |a| Ok(a.rating.map(Scalar::from)),
            |a, v| {
                a.rating = Some(v.into_i32()?);
                Ok(())
            },
        )
        .field_with(
            "tag",
            FieldType::Text,
            FieldOptions::default().index(IndexHint::NotAnalyzed),
            |a| Ok(a.tag.clone().map(Scalar::from)),
            |a, v| {
                a.tag = Some(v.into_string()?);
                Ok(())
            },
        )
        .field_with(
            "draft",
            FieldType::Text,
            FieldOptions::transient(),
            |a| Ok(a.draft.clone().map(Scalar::from)),
            |a, v| {
                a.draft = Some(v.into_string()?);
                Ok(())
            },
        )
        .build()
        .unwrap()
}

/// Not searchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    pub id: i64,
    pub body: Option<String>,
}

pub fn note_type() -> ModelType<Note> {
    ModelType::<Note>::builder("Note")
        .key(|n| n.id.to_string())
        .field(
            "body",
            FieldType::Text,
            |n| Ok(n.body.clone().map(Scalar::from)),
            |n, v| {
                n.body = Some(v.into_string()?);
                Ok(())
            },
        )
        .build()
        .unwrap()
}

/// Searchable, but its only field can never be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Broken {
    pub id: i64,
}

pub fn broken_type() -> ModelType<Broken> {
    ModelType::<Broken>::builder("Broken")
        .searchable()
        .key(|b| b.id.to_string())
        .field(
            "secret",
            FieldType::Text,
            |_| Err(FieldError::Unreadable("access denied".to_string())),
            |_, _| Ok(()),
        )
        .build()
        .unwrap()
}

/// Searchable, but instances can never be constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Sealed {
    pub id: i64,
}

pub fn sealed_type() -> ModelType<Sealed> {
    ModelType::<Sealed>::builder_with("Sealed", || {
        Err(FieldError::Construct("no public constructor".to_string()))
    })
    .searchable()
    .key(|s| s.id.to_string())
    .field(
        "id",
        FieldType::Long,
        |s| Ok(Some(Scalar::from(s.id))),
        |s, v| {
            s.id = v.into_i64()?;
            Ok(())
        },
    )
    .build()
    .unwrap()
}

/// Wraps an [`InMemoryIndex`], logging every call and failing on demand.
pub struct RecordingIndex {
    pub inner: InMemoryIndex,
    calls: Mutex<Vec<String>>,
    fail_create: AtomicBool,
    fail_upsert: AtomicBool,
    fail_delete: AtomicBool,
    fail_search: AtomicBool,
}

impl RecordingIndex {
    pub fn new() -> Self {
        Self {
            inner: InMemoryIndex::new(),
            calls: Mutex::new(Vec::new()),
            fail_create: AtomicBool::new(false),
            fail_upsert: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_search: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn fail_upsert(&self) {
        self.fail_upsert.store(true, Ordering::SeqCst);
    }

    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub fn fail_search(&self) {
        self.fail_search.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IndexClient for RecordingIndex {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        self.record(format!("exists {index}"));
        self.inner.index_exists(index).await
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        self.record(format!("delete-index {index}"));
        self.inner.delete_index(index).await
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()> {
        self.record(format!("create {index}"));
        if self.fail_create.load(Ordering::SeqCst) {
            bail!("create refused");
        }
        self.inner.create_index(index, schema).await
    }

    async fn upsert(
        &self,
        index: &str,
        type_name: &str,
        id: &str,
        document: &Document,
    ) -> Result<()> {
        self.record(format!("upsert {type_name}/{id}"));
        if self.fail_upsert.load(Ordering::SeqCst) {
            bail!("upsert refused");
        }
        self.inner.upsert(index, type_name, id, document).await
    }

    async fn delete(&self, index: &str, type_name: &str, id: &str) -> Result<()> {
        self.record(format!("delete {type_name}/{id}"));
        if self.fail_delete.load(Ordering::SeqCst) {
            bail!("delete refused");
        }
        self.inner.delete(index, type_name, id).await
    }

    async fn search(
        &self,
        index: &str,
        type_name: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse> {
        self.record(format!("search {type_name}"));
        if self.fail_search.load(Ordering::SeqCst) {
            bail!("search refused");
        }
        self.inner.search(index, type_name, query).await
    }

    async fn close(&self) -> Result<()> {
        self.record("close".to_string());
        Ok(())
    }
}
