//! # Model Search CLI (`msearch`)
//!
//! ## Usage
//!
//! ```bash
//! msearch --config ./config/msearch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `msearch schema` | Print the index schema derived from the models |
//! | `msearch init` | Drop and recreate the index |
//! | `msearch replay <file>` | Route a JSON-lines event log into the index |
//! | `msearch search <type> "<query>"` | Search one model type |
//!
//! ## Examples
//!
//! ```bash
//! # Rebuild the index and load events
//! msearch replay ./data/events.jsonl --config ./config/msearch.toml
//!
//! # Second page of articles mentioning rust
//! msearch search article "rust" --from 10 --size 10
//! ```

use clap::{Parser, Subcommand};
use model_search::{config, index_cmd, logging, replay, search};
use std::path::PathBuf;

/// Model Search CLI: keeps a search index in sync with a typed object model.
///
/// All commands except `schema` read a TOML configuration file given by
/// `--config`. See `config/msearch.example.toml`.
#[derive(Parser)]
#[command(
    name = "msearch",
    about = "Model Search: keeps a search index in sync with a typed object model",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/msearch.toml")]
    config: PathBuf,

    /// Log at debug level (includes skipped fields and ignored events).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the index schema as JSON.
    ///
    /// Only searchable models appear. Does not touch the index.
    Schema,

    /// Drop and recreate the index with the current schema.
    ///
    /// All indexed documents are lost.
    Init,

    /// Recreate the index, then replay an event log into it.
    ///
    /// Each line is `{"event": "...", "type": "...", "object": {...}}`.
    Replay {
        /// Path to the JSON-lines event log.
        path: PathBuf,
    },

    /// Search one model type and print the materialized hits.
    Search {
        /// Model type (`Article` or `Author`, or its slug).
        model: String,

        /// Query string, passed to the backend verbatim. `*` matches all.
        query: String,

        /// Offset of the first hit.
        #[arg(long, default_value_t = 0)]
        from: usize,

        /// Maximum number of hits to return.
        #[arg(long, default_value_t = 10)]
        size: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Commands::Schema = cli.command {
        index_cmd::run_schema()?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Schema => {
            // Handled above (before config loading)
            unreachable!()
        }
        Commands::Init => {
            index_cmd::run_init(&cfg).await?;
        }
        Commands::Replay { path } => {
            replay::run_replay(&cfg, &path).await?;
        }
        Commands::Search {
            model,
            query,
            from,
            size,
        } => {
            search::run_search(&cfg, &model, &query, from, size).await?;
        }
    }

    Ok(())
}
