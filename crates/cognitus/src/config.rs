//! TOML configuration parsing and validation.
//!
//! Cognitus reads a single TOML file (default `./config/cognitus.toml`).
//! Every section except `[index]` and `[collection]` is optional.
//!
//! ```toml
//! [index]
//! path = "./data/index.sqlite"
//!
//! [collection]
//! path = "./data/collection.sqlite"
//!
//! [dedup]
//! threshold = 90
//!
//! [generation]
//! provider = "openrouter"
//! model = "anthropic/claude-3.5-sonnet"
//!
//! [log]
//! path = "./cognitus.log"
//!
//! [server]
//! bind = "127.0.0.1:7341"
//! ```
//!
//! Secrets never live in this file: the generation API key is read from
//! `OPENROUTER_API_KEY` when a request is made.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use cognitus_core::classify::DEFAULT_THRESHOLD;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub index: IndexConfig,
    pub collection: CollectionConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Location of the local FTS5 similarity index.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    pub path: PathBuf,
}

/// Location of the authoritative card collection.
#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DedupConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u8,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Append log lines to this file instead of stderr.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
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

impl Config {
    /// Defaults rooted at `./data`, for commands that can run without a
    /// config file.
    pub fn minimal() -> Self {
        Self {
            index: IndexConfig {
                path: PathBuf::from("./data/index.sqlite"),
            },
            collection: CollectionConfig {
                path: PathBuf::from("./data/collection.sqlite"),
            },
            dedup: DedupConfig::default(),
            generation: GenerationConfig::default(),
            log: LogConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.dedup.threshold > 100 {
        bail!("dedup.threshold must be in [0, 100]");
    }

    if config.index.path == config.collection.path {
        bail!("index.path and collection.path must point to different files");
    }

    match config.generation.provider.as_str() {
        "disabled" => {}
        "openrouter" => {
            if config.generation.model.is_none() {
                bail!("generation.model must be specified when provider is 'openrouter'");
            }
            if config.generation.timeout_secs == 0 {
                bail!("generation.timeout_secs must be > 0");
            }
        }
        other => bail!(
            "Unknown generation provider: '{}'. Must be disabled or openrouter.",
            other
        ),
    }

    Ok(())
}
