//! Configuration for rope construction

use crate::error::{Result, RopeError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default upper bound on leaf content, in bytes
pub const DEFAULT_MAX_LEAF_BYTES: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RopeConfig {
    /// Leaves are cut to at most this many bytes
    #[serde(default = "default_max_leaf_bytes")]
    pub max_leaf_bytes: usize,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Hash-cons nodes through a shared intern table
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Number of independently locked shards in the intern table
    #[serde(default = "default_cache_shards")]
    pub shards: usize,
}

impl Default for RopeConfig {
    fn default() -> Self {
        Self {
            max_leaf_bytes: default_max_leaf_bytes(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            shards: default_cache_shards(),
        }
    }
}

fn default_max_leaf_bytes() -> usize { DEFAULT_MAX_LEAF_BYTES }
fn default_cache_enabled() -> bool { true }
fn default_cache_shards() -> usize { 16 }

impl RopeConfig {
    /// Default config with a different leaf size
    pub fn with_max_leaf_bytes(max_leaf_bytes: usize) -> Self {
        Self {
            max_leaf_bytes,
            ..Self::default()
        }
    }

    /// Same config with hash-consing switched off
    pub fn without_cache(mut self) -> Self {
        self.cache.enabled = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_leaf_bytes == 0 {
            return Err(RopeError::config("max_leaf_bytes must be at least 1"));
        }
        if self.cache.shards == 0 {
            return Err(RopeError::config("cache.shards must be at least 1"));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RopeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}
