// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher configuration.
//!
//! Built once at startup: defaults, then an optional TOML file, then
//! environment overrides. The resulting value is passed explicitly into the
//! server; nothing reads configuration from ambient state afterwards.

use std::path::{Path, PathBuf};

use gantry_core::BuildId;
use serde::Deserialize;
use thiserror::Error;

use crate::env;

/// Default listen address.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8154";

/// Config file looked up in the working directory when GANTRY_CONFIG is unset.
pub const CONFIG_FILE_NAME: &str = "gantry.toml";

/// Errors loading configuration.
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
}

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the listener binds (host:port)
    pub address: String,
    /// PEM certificate handed to registering agents
    pub cert_file: PathBuf,
    /// PEM private key handed to registering agents
    pub key_file: PathBuf,
    /// Root of per-build storage
    pub working_dir: PathBuf,
    /// Server log file (defaults to `<working_dir>/gantryd.log`)
    pub log_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let working_dir = PathBuf::from(".");
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            cert_file: working_dir.join("config").join("server.crt"),
            key_file: working_dir.join("config").join("server.key"),
            working_dir,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration for the dispatcher.
    ///
    /// Reads `$GANTRY_CONFIG` (or `./gantry.toml` if present), then applies
    /// environment overrides.
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
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(address) = env::address() {
            self.address = address;
        }
        if let Some(cert) = env::cert_file() {
            self.cert_file = cert;
        }
        if let Some(key) = env::key_file() {
            self.key_file = key;
        }
        if let Some(dir) = env::working_dir() {
            self.working_dir = dir;
        }
        self
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| self.working_dir.join("gantryd.log"))
    }

    pub fn build_paths(&self) -> BuildPaths {
        BuildPaths::new(&self.working_dir)
    }
}

/// A build id or artifact name that would resolve outside its build directory.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("build id {0:?} is not a valid directory name")]
    BuildId(BuildId),

    #[error("artifact name {0:?} is not a valid file name")]
    Artifact(String),
}

/// Server-side file layout for builds, all rooted under `<working_dir>/<build_id>/`.
///
/// Build ids arrive from agents, so every accessor checks that the id names a
/// single plain directory below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    root: PathBuf,
}

impl BuildPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn build_dir(&self, build_id: &BuildId) -> Result<PathBuf, PathError> {
        if !is_plain_name(build_id.as_str()) {
            return Err(PathError::BuildId(build_id.clone()));
        }
        Ok(self.root.join(build_id.as_str()))
    }

    pub fn console_log_file(&self, build_id: &BuildId) -> Result<PathBuf, PathError> {
        Ok(self.build_dir(build_id)?.join("console.log"))
    }

    pub fn artifact_file(&self, build_id: &BuildId, file: &str) -> Result<PathBuf, PathError> {
        if !is_plain_name(file) {
            return Err(PathError::Artifact(file.to_string()));
        }
        Ok(self.build_dir(build_id)?.join("artifacts").join(file))
    }

    pub fn checksum_file(&self, build_id: &BuildId) -> Result<PathBuf, PathError> {
        Ok(self.build_dir(build_id)?.join("md5.checksum"))
    }

    /// Holds the terminal result once the build completes.
    pub fn result_file(&self, build_id: &BuildId) -> Result<PathBuf, PathError> {
        Ok(self.build_dir(build_id)?.join("result"))
    }
}

/// One normal path component: non-empty, not `.`/`..`, no separators.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
