use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cache.ttl_seconds must be greater than zero")]
    ZeroTtl,

    #[error("cache.template_ttl_seconds.{0} must be greater than zero")]
    ZeroTemplateTtl(String),

    #[error("source.timeout_seconds must be greater than zero")]
    ZeroTimeout,
}

/// Top-level configuration for the usage insights service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightsConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl InsightsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.cache.validate()
    }
}

/// Where account-usage data is read from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Path to the SQLite replica of the account-usage views.
    pub sqlite_path: String,
    /// Deadline for a single statement before it fails as a timeout.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "data/account_usage.db".to_string(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Configuration for the query result cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Default freshness bound for every query template.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Upper bound on stored results. Unbounded when omitted.
    #[serde(default)]
    pub max_entries: Option<u64>,
    /// Collapse concurrent misses on the same key into one computation.
    #[serde(default)]
    pub single_flight: bool,
    /// Per-template TTL overrides, keyed by template id.
    #[serde(default)]
    pub template_ttl_seconds: HashMap<String, u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            max_entries: None,
            single_flight: false,
            template_ttl_seconds: HashMap::new(),
        }
    }
}

impl CacheConfig {
    /// TTL for a template: its override if configured, otherwise the default.
    pub fn ttl_for(&self, template_id: &str) -> u64 {
        self.template_ttl_seconds
            .get(template_id)
            .copied()
            .unwrap_or(self.ttl_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_seconds == 0 {
            return Err(ConfigError::ZeroTtl);
        }
        if let Some((id, _)) = self.template_ttl_seconds.iter().find(|(_, ttl)| **ttl == 0) {
            return Err(ConfigError::ZeroTemplateTtl(id.clone()));
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    120
}
fn default_ttl() -> u64 {
    3600
}
