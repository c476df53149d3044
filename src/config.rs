use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://yields.llama.fi".to_string()
}
fn default_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    15 * 60
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_enrich_history")]
    pub enrich_history: bool,
    #[serde(default = "default_history_concurrency")]
    pub history_concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            enrich_history: default_enrich_history(),
            history_concurrency: default_history_concurrency(),
        }
    }
}

fn default_enrich_history() -> bool {
    true
}
fn default_history_concurrency() -> usize {
    8
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    /// Identifiers that get their own section in the general overview.
    #[serde(default = "default_highlights")]
    pub highlights: Vec<String>,
    /// Phrases that append the general overview to retrieved context.
    #[serde(default = "default_overview_triggers")]
    pub overview_triggers: Vec<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            highlights: default_highlights(),
            overview_triggers: default_overview_triggers(),
        }
    }
}

fn default_highlights() -> Vec<String> {
    vec!["bifrost".to_string()]
}
fn default_overview_triggers() -> Vec<String> {
    ["highest apy", "top apy", "best yield", "top lst", "top protocol"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to defaults.
///
/// Returns the config and whether the file was actually read.
pub fn load_or_default(path: &Path) -> Result<(Config, bool)> {
    if path.exists() {
        Ok((load_config(path)?, true))
    } else {
        Ok((Config::default(), false))
    }
}

pub fn validate(config: &Config) -> Result<()> {
    if config.provider.base_url.trim().is_empty() {
        anyhow::bail!("provider.base_url must not be empty");
    }

    if config.provider.timeout_secs == 0 {
        anyhow::bail!("provider.timeout_secs must be > 0");
    }

    if config.ingest.history_concurrency == 0 {
        anyhow::bail!("ingest.history_concurrency must be >= 1");
    }

    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    config
        .server
        .bind
        .parse::<std::net::SocketAddr>()
        .with_context(|| format!("server.bind is not a socket address: {}", config.server.bind))?;

    Ok(())
}
