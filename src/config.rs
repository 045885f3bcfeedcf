//! TOML configuration.
//!
//! ```toml
//! [application]
//! name = "blog"
//!
//! [index]
//! backend = "sqlite"     # memory | http | sqlite
//! url = "http://127.0.0.1:9200"
//! timeout_secs = 30
//!
//! [sqlite]
//! path = "./data/msearch.sqlite"
//! ```

use anyhow::{Context, Result};
use model_search_core::slug::slugify;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub application: ApplicationConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationConfig {
    /// Application name; its slug is the index name.
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Http,
    Sqlite,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Http => "http",
            Backend::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_backend")]
    pub backend: Backend,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_backend() -> Backend {
    Backend::Memory
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SqliteConfig {
    pub path: PathBuf,
}

impl Config {
    /// Index name derived from the application name.
    pub fn index_name(&self) -> String {
        slugify(&self.application.name)
    }

    /// In-memory config for tests and one-off runs.
    pub fn memory(name: &str) -> Self {
        Self {
            application: ApplicationConfig {
                name: name.to_string(),
            },
            index: IndexConfig::default(),
            sqlite: None,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.application.name.trim().is_empty() {
        anyhow::bail!("application.name must not be empty");
    }
    if config.index_name().is_empty() {
        anyhow::bail!(
            "application.name '{}' does not produce a usable index name",
            config.application.name
        );
    }

    if config.index.timeout_secs == 0 {
        anyhow::bail!("index.timeout_secs must be > 0");
    }

    match config.index.backend {
        Backend::Memory => {}
        Backend::Http => {
            let url = config.index.url.as_deref().unwrap_or("").trim();
            if url.is_empty() {
                anyhow::bail!("index.url must be specified when backend is 'http'");
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("index.url must start with http:// or https://, got '{}'", url);
            }
        }
        Backend::Sqlite => {
            if config.sqlite.is_none() {
                anyhow::bail!("[sqlite] path must be specified when backend is 'sqlite'");
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults_to_memory() {
        let cfg = parse_config("[application]\nname = \"Blog\"\n").unwrap();
        assert_eq!(cfg.index.backend, Backend::Memory);
        assert_eq!(cfg.index.timeout_secs, 30);
        assert_eq!(cfg.index_name(), "blog");
    }

    #[test]
    fn test_sqlite_config() {
        let cfg = parse_config(
            r#"
[application]
name = "My Blog"

[index]
backend = "sqlite"

[sqlite]
path = "./data/msearch.sqlite"
"#,
        )
        .unwrap();
        assert_eq!(cfg.index.backend, Backend::Sqlite);
        assert_eq!(cfg.index_name(), "my-blog");
        assert_eq!(
            cfg.sqlite.unwrap().path,
            PathBuf::from("./data/msearch.sqlite")
        );
    }

    #[test]
    fn test_http_requires_url() {
        let err = parse_config("[application]\nname = \"blog\"\n[index]\nbackend = \"http\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("index.url"));

        let err = parse_config(
            "[application]\nname = \"blog\"\n[index]\nbackend = \"http\"\nurl = \"localhost:9200\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_sqlite_requires_path() {
        let err = parse_config("[application]\nname = \"blog\"\n[index]\nbackend = \"sqlite\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("[sqlite]"));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result =
            parse_config("[application]\nname = \"blog\"\n[index]\nbackend = \"solr\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_names_rejected() {
        assert!(parse_config("[application]\nname = \"  \"\n").is_err());
        assert!(parse_config("[application]\nname = \"???\"\n").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = parse_config("[application]\nname = \"blog\"\n[index]\ntimeout_secs = 0\n")
            .unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
