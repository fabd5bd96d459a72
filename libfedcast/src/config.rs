//! Configuration management for Fedcast

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reach: ReachConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Tunables for reach resolution
///
/// Passed to the resolver at construction; there is no ambient global
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachConfig {
    /// How many of the author's most recent statuses contribute mentions
    #[serde(default = "default_mention_window")]
    pub mention_window: usize,

    /// Page size for the followers query; bounds memory for large audiences
    #[serde(default = "default_follower_page_size")]
    pub follower_page_size: usize,

    /// Default chunk size for chunked consumption of the endpoint set
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_mention_window() -> usize {
    5
}

fn default_follower_page_size() -> usize {
    1000
}

fn default_chunk_size() -> usize {
    100
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            mention_window: default_mention_window(),
            follower_page_size: default_follower_page_size(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            database: DatabaseConfig {
                path: "~/.local/share/fedcast/fedcast.db".to_string(),
            },
            reach: ReachConfig::default(),
        }
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("FEDCAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("fedcast").join("config.toml"))
}

/// Resolve the data directory path following XDG Base Directory spec
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("fedcast"))
}
