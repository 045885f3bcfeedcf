//! Demo object model used by the `msearch` binary.
//!
//! | Model | Searchable | Notes |
//! |-------|------------|-------|
//! | [`Article`] | yes | multi-field title, 64-bit view count, author relation, date |
//! | [`Author`] | yes | exact-match email, 32-bit article count |
//! | [`AuditEntry`] | no | never reaches the index |

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use model_search_core::{
    FieldError, FieldOptions, FieldType, IndexHint, ModelRegistry, ModelType, Scalar,
};
use serde::{Deserialize, Serialize};
use std::any::Any;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub views: i64,
    pub rating: Option<i32>,
    pub author_id: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
    pub slug: Option<String>,
    /// Editor scratch space; never indexed.
    pub draft_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub article_count: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditEntry {
    pub id: i64,
    pub action: String,
}

fn text(value: &Option<String>) -> Result<Option<Scalar>, FieldError> {
    Ok(value.clone().map(Scalar::from))
}

pub fn article_type() -> Result<ModelType<Article>> {
    let model = ModelType::<Article>::builder("Article")
        .searchable()
        .key(|a| a.id.to_string())
        .field(
            "id",
            FieldType::Long,
            |a| Ok(Some(Scalar::from(a.id))),
            |a, v| {
                a.id = v.into_i64()?;
                Ok(())
            },
        )
        .field_with(
            "title",
            FieldType::Text,
            FieldOptions::default().multi_field([IndexHint::Analyzed, IndexHint::NotAnalyzed]),
            |a| text(&a.title),
            |a, v| {
                a.title = Some(v.into_string()?);
                Ok(())
            },
        )
        .field(
            "body",
            FieldType::Text,
            |a| text(&a.body),
            |a, v| {
                a.body = Some(v.into_string()?);
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
        .field(
            "rating",
            FieldType::Integer,
            |a| Ok(a.rating.map(Scalar::from)),
            |a, v| {
                a.rating = Some(v.into_i32()?);
                Ok(())
            },
        )
        .relation(
            "authorId",
            |a| Ok(a.author_id.map(|id| Scalar::from(id.to_string()))),
            |a, v| {
                let key = v.into_string()?;
                let id = key
                    .parse()
                    .map_err(|_| FieldError::Invalid(format!("'{}' is not an author id", key)))?;
                a.author_id = Some(id);
                Ok(())
            },
        )
        .field(
            "publishedAt",
            FieldType::Date,
            |a| Ok(a.published_at.map(Scalar::from)),
            |a, v| {
                a.published_at = Some(v.into_datetime()?);
                Ok(())
            },
        )
        .field_with(
            "slug",
            FieldType::Text,
            FieldOptions::default().index(IndexHint::NotAnalyzed),
            |a| text(&a.slug),
            |a, v| {
                a.slug = Some(v.into_string()?);
                Ok(())
            },
        )
        .field_with(
            "draftNotes",
            FieldType::Text,
            FieldOptions::transient(),
            |a| text(&a.draft_notes),
            |a, v| {
                a.draft_notes = Some(v.into_string()?);
                Ok(())
            },
        )
        .build()?;
    Ok(model)
}

pub fn author_type() -> Result<ModelType<Author>> {
    let model = ModelType::<Author>::builder("Author")
        .searchable()
        .key(|a| a.id.to_string())
        .field(
            "id",
            FieldType::Long,
            |a| Ok(Some(Scalar::from(a.id))),
            |a, v| {
                a.id = v.into_i64()?;
                Ok(())
            },
        )
        .field(
            "name",
            FieldType::Text,
            |a| text(&a.name),
            |a, v| {
                a.name = Some(v.into_string()?);
                Ok(())
            },
        )
        .field_with(
            "email",
            FieldType::Text,
            FieldOptions::default().index(IndexHint::NotAnalyzed),
            |a| text(&a.email),
            |a, v| {
                a.email = Some(v.into_string()?);
                Ok(())
            },
        )
        .field(
            "articleCount",
            FieldType::Integer,
            |a| Ok(Some(Scalar::from(a.article_count))),
            |a, v| {
                a.article_count = v.into_i32()?;
                Ok(())
            },
        )
        .field(
            "active",
            FieldType::Bool,
            |a| Ok(Some(Scalar::from(a.active))),
            |a, v| {
                a.active = v.into_bool()?;
                Ok(())
            },
        )
        .build()?;
    Ok(model)
}

pub fn audit_entry_type() -> Result<ModelType<AuditEntry>> {
    let model = ModelType::<AuditEntry>::builder("AuditEntry")
        .key(|e| e.id.to_string())
        .field(
            "action",
            FieldType::Text,
            |e| Ok(Some(Scalar::from(e.action.as_str()))),
            |e, v| {
                e.action = v.into_string()?;
                Ok(())
            },
        )
        .build()?;
    Ok(model)
}

/// Registry holding every demo model.
pub fn demo_registry() -> Result<ModelRegistry> {
    let registry = ModelRegistry::new()
        .with(article_type()?)?
        .with(author_type()?)?
        .with(audit_entry_type()?)?;
    Ok(registry)
}

/// A decoded demo object of any registered type.
#[derive(Debug, Clone, PartialEq)]
pub enum DemoObject {
    Article(Article),
    Author(Author),
    AuditEntry(AuditEntry),
}

impl DemoObject {
    /// Decode `object` as the model named `model` (registered name or slug).
    pub fn decode(model: &str, object: serde_json::Value) -> Result<Self> {
        let decoded = match model {
            "Article" | "article" => DemoObject::Article(
                serde_json::from_value(object).context("Invalid Article object")?,
            ),
            "Author" | "author" => DemoObject::Author(
                serde_json::from_value(object).context("Invalid Author object")?,
            ),
            "AuditEntry" | "auditentry" => DemoObject::AuditEntry(
                serde_json::from_value(object).context("Invalid AuditEntry object")?,
            ),
            other => bail!(
                "Unknown model type: '{}'. Available: Article, Author, AuditEntry",
                other
            ),
        };
        Ok(decoded)
    }

    pub fn as_any(&self) -> &(dyn Any + Send + Sync) {
        match self {
            DemoObject::Article(a) => a,
            DemoObject::Author(a) => a,
            DemoObject::AuditEntry(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_search_core::build_schema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_demo_schema() {
        let registry = demo_registry().unwrap();
        let schema = build_schema(registry.participating());
        assert_eq!(
            schema.to_json(),
            json!({
                "article": { "properties": {
                    "id": { "type": "long" },
                    "title": { "type": "multi_field" },
                    "body": { "type": "string" },
                    "views": { "type": "long" },
                    "rating": { "type": "integer" },
                    "authorId": { "type": "string" },
                    "publishedAt": { "type": "string" },
                    "slug": { "type": "string", "index": "not_analyzed" }
                } },
                "author": { "properties": {
                    "id": { "type": "long" },
                    "name": { "type": "string" },
                    "email": { "type": "string", "index": "not_analyzed" },
                    "articleCount": { "type": "integer" },
                    "active": { "type": "string" }
                } }
            })
        );
    }

    #[test]
    fn test_audit_entries_not_searchable() {
        let registry = demo_registry().unwrap();
        assert!(!registry.is_participating::<AuditEntry>());
        assert!(registry.is_participating::<Article>());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_decode_by_name_or_slug() {
        let object = DemoObject::decode("article", json!({ "id": 4, "title": "Hi" })).unwrap();
        assert_eq!(
            object,
            DemoObject::Article(Article {
                id: 4,
                title: Some("Hi".to_string()),
                ..Article::default()
            })
        );
        assert!(DemoObject::decode("Comment", json!({})).is_err());
        assert!(DemoObject::decode("Author", json!({ "id": "x" })).is_err());
    }

    #[test]
    fn test_as_any_exposes_concrete_type() {
        let object = DemoObject::Author(Author {
            id: 1,
            ..Author::default()
        });
        assert!(object.as_any().downcast_ref::<Author>().is_some());
    }
}
