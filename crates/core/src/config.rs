// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend configuration, loaded from TOML.
//!
//! ```toml
//! [backends.live]
//! type = "livestatus"
//! socket = "tcp://monitor.example.com:6557"
//!
//! [backends.local]
//! type = "statusdat"
//! objects_file = "/var/cache/icinga/objects.cache"
//! status_file = "/var/cache/icinga/status.dat"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("invalid backend configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// All configured backends, by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendsConfig {
    #[serde(default)]
    pub backends: BTreeMap<String, BackendConfig>,
}

impl BackendsConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml(&text)
    }

    pub fn get(&self, name: &str) -> Option<&BackendConfig> {
        self.backends.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    Livestatus(LivestatusConfig),
    Statusdat(StatusdatConfig),
}

/// Livestatus socket settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivestatusConfig {
    /// Absolute UNIX socket path, or `tcp://host:port`
    pub socket: String,
    /// Per-operation socket deadline; falls back to `MON_IO_TIMEOUT_MS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl LivestatusConfig {
    pub fn new(socket: impl Into<String>) -> Self {
        Self { socket: socket.into(), timeout_ms: None }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_ms.map(Duration::from_millis).unwrap_or_else(env::io_timeout)
    }
}

/// Status.dat reader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusdatConfig {
    pub objects_file: PathBuf,
    pub status_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,
    #[serde(default)]
    pub no_cache: bool,
}

impl StatusdatConfig {
    pub fn new(objects_file: impl Into<PathBuf>, status_file: impl Into<PathBuf>) -> Self {
        Self {
            objects_file: objects_file.into(),
            status_file: status_file.into(),
            cache_path: None,
            no_cache: false,
        }
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(env::cache_dir)
    }

    pub fn cache_enabled(&self) -> bool {
        !self.no_cache && !env::no_cache()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
