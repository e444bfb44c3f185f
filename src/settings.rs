//! Settings for the `search-syntax` binary.
//!
//! Read with the `config` crate from an optional TOML file (default
//! `search_syntax.toml`, or whatever `SEARCH_SYNTAX_CONFIG` points at) with
//! `SEARCH_SYNTAX_*` environment variables layered on top.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_CONFIG_FILE: &str = "search_syntax.toml";
pub const CONFIG_PATH_VARIABLE: &str = "SEARCH_SYNTAX_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Queries longer than this (in bytes) are not parsed at all and are
    /// shown as plain free text. The parser itself has no bound.
    pub max_query_length: Option<usize>,
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { log_filter: "info".into(), max_query_length: None, pretty: true }
    }
}

impl Settings {
    /// Loads from `path` (a missing file is fine) and the environment.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("SEARCH_SYNTAX").try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Loads from the file named by `SEARCH_SYNTAX_CONFIG`, else the default file.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VARIABLE).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load(&path)
    }

    pub fn admits(&self, query: &str) -> bool {
        self.max_query_length.is_none_or(|max| query.len() <= max)
    }
}
