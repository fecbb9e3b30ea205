//! Configuration file support for wo-hierarchy.
//!
//! Provides YAML-based configuration through `wo-hierarchy.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "wo-hierarchy.config.yml";

/// Timeout of the legacy report queries
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;
const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;
const DEFAULT_EXPAND_ALL_MAX_DEPTH: usize = 10;
const DEFAULT_LOG_FILTER: &str = "info";

/// Top-level configuration file schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Upper bound for one gateway call, in seconds
    pub fetch_timeout_secs: u64,
    /// Retries after a connection error or timeout
    pub max_retries: u32,
    /// Backoff unit between retries; attempt `n` waits `n * retry_backoff_ms`
    pub retry_backoff_ms: u64,
    /// Size of the background fetch pool
    pub max_concurrent_fetches: usize,
    /// Bound on cached job snapshots; unbounded when absent
    pub max_cached_jobs: Option<usize>,
    pub expand_all_max_depth: usize,
    pub log_filter: String,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            max_cached_jobs: None,
            expand_all_max_depth: DEFAULT_EXPAND_ALL_MAX_DEPTH,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            unknown_fields: HashMap::new(),
        }
    }
}

impl HierarchyConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<HierarchyConfig> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: HierarchyConfig = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<HierarchyConfig>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &HierarchyConfig) -> Result<()> {
    if config.fetch_timeout_secs == 0 {
        bail!(
            "Invalid config: fetch_timeout_secs must be greater than 0.\n\n\
             💡 Hint: The legacy queries use a 30 second timeout."
        );
    }
    if config.max_concurrent_fetches == 0 {
        bail!(
            "Invalid config: max_concurrent_fetches must be greater than 0.\n\n\
             💡 Hint: Use 1 to fetch one subtree at a time."
        );
    }
    if config.max_cached_jobs == Some(0) {
        bail!(
            "Invalid config: max_cached_jobs must be greater than 0.\n\n\
             💡 Hint: Remove the field to keep every visited job for the session."
        );
    }
    if config.log_filter.trim().is_empty() {
        bail!("Invalid config: log_filter must not be empty.");
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &HierarchyConfig) {
    for key in config.unknown_fields.keys() {
        tracing::warn!(field = %key, "unknown config field will be ignored");
    }
}
