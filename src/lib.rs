//! # Model Search
//!
//! Keeps a search index consistent with a typed object model and maps
//! search hits back into typed objects.
//!
//! The mapping layer lives in [`model_search_core`]; this crate adds the
//! concrete index backends, configuration, a demo object model, and the
//! `msearch` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌──────────────────┐
//! │ object store │──▶│  ChangeRouter   │──▶│   IndexClient     │
//! │   events     │   │ (serialize)     │   │ memory/http/sqlite│
//! └──────────────┘   └────────────────┘   └────────┬─────────┘
//!                                                  │ hits
//!                                         ┌────────▼─────────┐
//!                                         │   materialize    │
//!                                         └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! msearch schema                     # print the derived index schema
//! msearch init                       # recreate the index
//! msearch replay events.jsonl        # route object store events
//! msearch search article "rust"      # typed search
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Demo object model and registry |
//! | [`backend`] | Index backend selection |
//! | [`http_index`] | Elasticsearch-compatible REST backend |
//! | [`sqlite_index`] | SQLite backend |
//! | [`db`] | Database connection |
//! | [`migrate`] | SQLite index tables |
//! | [`replay`] | Event log replay |
//! | [`search`] | Typed search command |
//! | [`index_cmd`] | Schema and init commands |
//! | [`logging`] | Tracing subscriber setup |

pub mod backend;
pub mod config;
pub mod db;
pub mod http_index;
pub mod index_cmd;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod replay;
pub mod search;
pub mod sqlite_index;
