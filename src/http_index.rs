//! Elasticsearch-compatible REST [`IndexClient`].
//!
//! | Operation | Request |
//! |-----------|---------|
//! | exists | `HEAD /{index}` |
//! | delete index | `DELETE /{index}` |
//! | create index | `PUT /{index}` with `{"mappings": <schema>}` |
//! | upsert | `PUT /{index}/{type}/{id}` with the document |
//! | delete | `DELETE /{index}/{type}/{id}` (404 is success) |
//! | search | `POST /{index}/{type}/_search` |
//!
//! Requests are not retried; the router decides what a failure means.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use model_search_core::{
    Document, IndexClient, IndexSchema, RawHit, SearchQuery, SearchResponse,
};
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub struct HttpIndex {
    client: reqwest::Client,
    base: Url,
}

impl HttpIndex {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid index url: '{}'", base_url))?;
        if base.cannot_be_a_base() {
            bail!("Index url cannot be used as a base: '{}'", base_url);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, base })
    }

    /// Base url with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Index url cannot be used as a base: '{}'", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body_text = response.text().await.unwrap_or_default();
    bail!("{} failed with {}: {}", what, status, body_text);
}

/// Request body for a search: match-all for an empty query, otherwise a
/// `query_string` query passed through verbatim.
pub fn search_body(query: &SearchQuery) -> Value {
    let clause = if query.terms().is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({ "query_string": { "query": query.query } })
    };
    json!({
        "from": query.from,
        "size": query.size,
        "query": clause,
    })
}

/// Parse a `_search` response. Accepts both the numeric and the
/// `{"value": n}` form of `hits.total`.
pub fn parse_search_response(json: &Value) -> Result<SearchResponse> {
    let hits = json
        .get("hits")
        .ok_or_else(|| anyhow!("Invalid search response: missing hits"))?;

    let total = match hits.get("total") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::Object(o)) => o.get("value").and_then(Value::as_u64),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Invalid search response: missing hits.total"))?;

    let items = hits
        .get("hits")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Invalid search response: missing hits.hits array"))?;

    let mut raw = Vec::with_capacity(items.len());
    for item in items {
        let id = item
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Invalid search response: hit without _id"))?;
        let source = match item.get("_source") {
            Some(source) => Document::from_json(source)
                .with_context(|| format!("Invalid _source for hit '{}'", id))?,
            None => Document::new(),
        };
        raw.push(RawHit {
            id: id.to_string(),
            score: item.get("_score").and_then(Value::as_f64),
            source,
        });
    }

    Ok(SearchResponse { hits: raw, total })
}

#[async_trait]
impl IndexClient for HttpIndex {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self.client.head(self.url(&[index])?).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => bail!("Checking index '{}' failed with {}", index, status),
        }
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        let response = self.client.delete(self.url(&[index])?).send().await?;
        check(response, &format!("Deleting index '{}'", index)).await?;
        Ok(())
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()> {
        let body = json!({ "mappings": schema });
        let response = self
            .client
            .put(self.url(&[index])?)
            .json(&body)
            .send()
            .await?;
        check(response, &format!("Creating index '{}'", index)).await?;
        Ok(())
    }

    async fn upsert(
        &self,
        index: &str,
        type_name: &str,
        id: &str,
        document: &Document,
    ) -> Result<()> {
        let response = self
            .client
            .put(self.url(&[index, type_name, id])?)
            .json(document)
            .send()
            .await?;
        check(response, &format!("Indexing '{}/{}'", type_name, id)).await?;
        Ok(())
    }

    async fn delete(&self, index: &str, type_name: &str, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&[index, type_name, id])?)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(index, type_name, id, "document already absent");
            return Ok(());
        }
        check(response, &format!("Deleting '{}/{}'", type_name, id)).await?;
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        type_name: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse> {
        let response = self
            .client
            .post(self.url(&[index, type_name, "_search"])?)
            .json(&search_body(query))
            .send()
            .await?;
        let response = check(response, &format!("Searching '{}/{}'", index, type_name)).await?;
        let json: Value = response.json().await?;
        parse_search_response(&json)
    }
}
