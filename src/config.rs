//! Runtime configuration.
//!
//! Loaded from a JSON file; every section has defaults so a partial file
//! (or no file at all) works. A handful of `TIMECARD_*` environment
//! variables override the file for container deployments.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TimecardError};

/// Backend service connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the record backend.
    pub base_url: String,
    /// Request timeout in seconds. A fetch or submit either completes or
    /// fails within this bound; it never hangs indefinitely.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://timetracker-backend:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Page cache tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a cached page may go unread before it expires.
    pub idle_secs: u64,
    /// Maximum number of cached pages; least-recently-read evicted first.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            idle_secs: 600,
            max_entries: 1000,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1).
    pub bind: String,
    /// Listen port.
    pub port: u16,
    /// Records per page when the caller doesn't ask for a length.
    pub page_length: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8081,
            page_length: 20,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration: file if given, defaults otherwise, then
    /// environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from_path(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a JSON config file. Missing sections fall back to defaults;
    /// an unreadable or invalid file is an error, not a silent default.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            TimecardError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&data).map_err(|e| {
            TimecardError::Config(format!("cannot parse {}: {e}", path.display()))
        })
    }

    /// Apply `TIMECARD_*` overrides from a key lookup (the environment in
    /// production, a closure in tests).
    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(url) = get("TIMECARD_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(bind) = get("TIMECARD_BIND") {
            self.server.bind = bind;
        }
        if let Some(port) = get("TIMECARD_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!(value = %port, "Ignoring unparseable TIMECARD_PORT"),
            }
        }
    }
}
