// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration and persisted identity.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gantry_core::{random_id, AgentId};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::env;

/// Dispatcher address used when nothing else is configured.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8154";

/// Interval between keepalive pings.
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(10);

/// Config file looked up in the current directory when GANTRY_AGENT_CONFIG is unset.
pub const CONFIG_FILE_NAME: &str = "gantry-agent.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config {path}: {reason}")]
    Invalid { path: PathBuf, reason: &'static str },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// On-disk shape of the agent config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    server_address: Option<String>,
    working_dir: Option<PathBuf>,
    hostname: Option<String>,
    keepalive_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Dispatcher address (host:port)
    pub server_address: String,
    /// Directory builds run in; also holds `config/guid.txt`
    pub working_dir: PathBuf,
    pub hostname: String,
    pub keepalive_interval: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            working_dir: PathBuf::from("."),
            hostname: local_hostname(),
            keepalive_interval: DEFAULT_KEEPALIVE,
        }
    }
}

impl AgentConfig {
    /// Defaults, then `$GANTRY_AGENT_CONFIG` (or `./gantry-agent.toml`), then env.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::config_path().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::default();
        if let Some(address) = file.server_address {
            config.server_address = address;
        }
        if let Some(dir) = file.working_dir {
            config.working_dir = dir;
        }
        if let Some(hostname) = file.hostname {
            config.hostname = hostname;
        }
        match file.keepalive_ms {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    path: path.to_path_buf(),
                    reason: "keepalive_ms must be greater than zero",
                })
            }
            Some(ms) => config.keepalive_interval = Duration::from_millis(ms),
            None => {}
        }
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(address) = env::server_address() {
            self.server_address = address;
        }
        if let Some(dir) = env::working_dir() {
            self.working_dir = dir;
        }
        if let Some(interval) = env::keepalive_interval() {
            self.keepalive_interval = interval;
        }
        self
    }

    pub fn uuid_file(&self) -> PathBuf {
        self.working_dir.join("config").join("guid.txt")
    }

    /// Identity persisted by an earlier run, if any.
    pub fn stored_uuid(&self) -> Result<Option<AgentId>, ConfigError> {
        let path = self.uuid_file();
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let id = text.trim();
                Ok((!id.is_empty()).then(|| AgentId::new(id)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    pub fn store_uuid(&self, id: &AgentId) -> Result<(), ConfigError> {
        let path = self.uuid_file();
        let write = |path: &Path| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, id.as_str())
        };
        write(&path).map_err(|source| ConfigError::Write { path, source })
    }

    /// Stored identity, generating and persisting a fresh one on first run.
    pub fn load_or_create_uuid(&self) -> Result<AgentId, ConfigError> {
        if let Some(id) = self.stored_uuid()? {
            return Ok(id);
        }
        let id = AgentId::new(random_id());
        self.store_uuid(&id)?;
        info!(agent = %id, path = %self.uuid_file().display(), "generated agent identity");
        Ok(id)
    }
}

fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
