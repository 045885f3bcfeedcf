//! Event replay: feed a JSON-lines log of object store events through the
//! change router.
//!
//! Each non-blank line is one event:
//!
//! ```json
//! {"event": "persisted", "type": "Article", "object": {"id": 1, "title": "Hi"}}
//! ```
//!
//! `event` is `persisted`, `updated`, `deleted`, or anything else (ignored).
//! Events are applied strictly in file order.

use anyhow::{Context, Result};
use model_search_core::{EventKind, LifecycleEvent, RouteOutcome, SearchAdapter};
use serde::Deserialize;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use crate::backend;
use crate::config::Config;
use crate::models::{demo_registry, DemoObject};

#[derive(Debug, Deserialize)]
pub struct EventLine {
    pub event: String,
    #[serde(rename = "type")]
    pub model: String,
    #[serde(default)]
    pub object: serde_json::Value,
}

pub fn parse_kind(event: &str) -> EventKind {
    match event {
        "persisted" => EventKind::Persisted,
        "updated" => EventKind::Updated,
        "deleted" => EventKind::Deleted,
        other => EventKind::Other(other.to_string()),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub events: u64,
    pub indexed: u64,
    pub removed: u64,
    pub not_searchable: u64,
    pub failed: u64,
    pub ignored: u64,
}

impl ReplayStats {
    fn record(&mut self, outcome: RouteOutcome) {
        match outcome {
            RouteOutcome::Indexed => self.indexed += 1,
            RouteOutcome::Removed => self.removed += 1,
            RouteOutcome::NotSearchable => self.not_searchable += 1,
            RouteOutcome::SerializationSkipped | RouteOutcome::UpsertFailed => self.failed += 1,
            RouteOutcome::Ignored => self.ignored += 1,
        }
    }
}

/// Route every event in `reader` through `adapter`.
///
/// Stops at the first malformed line or failed delete.
pub async fn replay_events(adapter: &SearchAdapter, reader: impl BufRead) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let entry: EventLine = serde_json::from_str(&line)
            .with_context(|| format!("Invalid event on line {}", line_no))?;
        let object = DemoObject::decode(&entry.model, entry.object)
            .with_context(|| format!("Invalid object on line {}", line_no))?;

        let event = LifecycleEvent::new(parse_kind(&entry.event), object.as_any());
        let outcome = adapter
            .on_event(event)
            .await
            .with_context(|| format!("Event on line {} failed", line_no))?;
        stats.events += 1;
        stats.record(outcome);
    }

    Ok(stats)
}

pub async fn run_replay(config: &Config, path: &Path) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open event log: {}", path.display()))?;

    let registry = Arc::new(demo_registry()?);
    let client = backend::connect_index(config).await?;
    let adapter = SearchAdapter::start(registry, client, config.index_name()).await?;

    let stats = replay_events(&adapter, std::io::BufReader::new(file)).await?;

    println!("replay {}", path.display());
    println!("  events: {}", stats.events);
    println!("  indexed: {}", stats.indexed);
    println!("  removed: {}", stats.removed);
    println!("  not searchable: {}", stats.not_searchable);
    println!("  failed: {}", stats.failed);
    println!("  ignored: {}", stats.ignored);
    println!("ok");

    adapter.shutdown().await?;
    Ok(())
}
