//! TOML configuration.
//!
//! ```toml
//! [service]
//! base_url = "http://127.0.0.1:5000"
//! timeout_secs = 60
//!
//! [search]
//! default_algorithm = "hybrid"
//!
//! [chat]
//! context_turns = 5
//! ```
//!
//! Every section and key is optional.

use anyhow::{Context, Result};
use docchat_core::{AlgorithmId, DEFAULT_CONTEXT_TURNS};
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/docchat.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Where the retrieval and generation endpoints live.
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_algorithm")]
    pub default_algorithm: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_algorithm: default_algorithm(),
        }
    }
}

fn default_algorithm() -> String {
    AlgorithmId::default().as_str().to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Prior turns sent as generation context. `0` sends none.
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            context_turns: default_context_turns(),
        }
    }
}

fn default_context_turns() -> usize {
    DEFAULT_CONTEXT_TURNS
}

impl Config {
    /// Parsed `service.base_url`. Valid after [`load_config`] / [`Config::validate`].
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.service.base_url)
            .with_context(|| format!("Invalid service.base_url: '{}'", self.service.base_url))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => anyhow::bail!(
                "service.base_url must use http or https, got '{}'",
                other
            ),
        }
    }

    pub fn default_algorithm(&self) -> Result<AlgorithmId> {
        Ok(self.search.default_algorithm.parse::<AlgorithmId>()?)
    }

    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.service.timeout_secs == 0 {
            anyhow::bail!("service.timeout_secs must be > 0");
        }

        self.default_algorithm()
            .context("Invalid search.default_algorithm")?;

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

/// Load the explicit path if given, else the default path if it exists,
/// else built-in defaults. `base_url` overrides `service.base_url`.
pub fn resolve_config(explicit: Option<&Path>, base_url: Option<&str>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_config(&default)?
            } else {
                debug!("No config file at {}; using defaults", DEFAULT_CONFIG_PATH);
                Config::default()
            }
        }
    };

    if let Some(url) = base_url {
        config.service.base_url = url.to_string();
        config.validate()?;
    }

    Ok(config)
}
