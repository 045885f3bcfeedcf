//! Adapter end-to-end against the SQLite backend.

use model_search::models::{demo_registry, Article, AuditEntry, Author};
use model_search::sqlite_index::SqliteIndex;
use model_search_core::search::search_model;
use model_search_core::{
    IndexClient, LifecycleEvent, RouteOutcome, SearchAdapter, SearchError, SearchQuery,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

async fn start(tmp: &TempDir) -> SearchAdapter {
    let index = SqliteIndex::open(&tmp.path().join("index.sqlite"))
        .await
        .unwrap();
    SearchAdapter::start(Arc::new(demo_registry().unwrap()), Arc::new(index), "blog")
        .await
        .unwrap()
}

fn article() -> Article {
    Article {
        id: 1,
        title: Some("Hi".to_string()),
        views: 42,
        author_id: Some(3),
        draft_notes: Some("scratch".to_string()),
        ..Article::default()
    }
}

#[tokio::test]
async fn test_round_trip_widens_views() {
    let tmp = TempDir::new().unwrap();
    let adapter = start(&tmp).await;

    let outcome = adapter
        .on_event(LifecycleEvent::persisted(&article()))
        .await
        .unwrap();
    assert_eq!(outcome, RouteOutcome::Indexed);

    let result = adapter.search::<Article>(&SearchQuery::new("hi")).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(
        result.hits,
        vec![Article {
            draft_notes: None,
            ..article()
        }]
    );
    assert_eq!(result.hits[0].views, 42i64);
    adapter.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_restart_recreates_index() {
    let tmp = TempDir::new().unwrap();
    let adapter = start(&tmp).await;
    adapter
        .on_event(LifecycleEvent::persisted(&article()))
        .await
        .unwrap();
    adapter.shutdown().await.unwrap();

    let adapter = start(&tmp).await;
    let result = adapter.search::<Article>(&SearchQuery::all()).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.total, 0);
}

#[tokio::test]
async fn test_documents_survive_reopen_without_recreate() {
    let tmp = TempDir::new().unwrap();
    let adapter = start(&tmp).await;
    let author = Author {
        id: 3,
        name: Some("Ada Lovelace".to_string()),
        email: Some("ada@example.com".to_string()),
        article_count: 2,
        active: true,
    };
    adapter
        .on_event(LifecycleEvent::persisted(&author))
        .await
        .unwrap();
    adapter.shutdown().await.unwrap();

    let index = SqliteIndex::open(&tmp.path().join("index.sqlite"))
        .await
        .unwrap();
    let registry = demo_registry().unwrap();
    let result = search_model::<Author>(&index, &registry, "blog", &SearchQuery::new("lovelace"))
        .await
        .unwrap();
    assert_eq!(result.hits, vec![author]);
    index.close().await.unwrap();
}

#[tokio::test]
async fn test_delete_then_search() {
    let tmp = TempDir::new().unwrap();
    let adapter = start(&tmp).await;
    adapter
        .on_event(LifecycleEvent::persisted(&article()))
        .await
        .unwrap();
    let outcome = adapter
        .on_event(LifecycleEvent::deleted(&article()))
        .await
        .unwrap();
    assert_eq!(outcome, RouteOutcome::Removed);

    let result = adapter.search::<Article>(&SearchQuery::all()).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_audit_entries_never_indexed() {
    let tmp = TempDir::new().unwrap();
    let adapter = start(&tmp).await;
    let entry = AuditEntry {
        id: 1,
        action: "login".to_string(),
    };

    let outcome = adapter
        .on_event(LifecycleEvent::persisted(&entry))
        .await
        .unwrap();
    assert_eq!(outcome, RouteOutcome::NotSearchable);

    let err = adapter
        .search::<AuditEntry>(&SearchQuery::all())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::NotSearchable(name) if name == "AuditEntry"));
}
