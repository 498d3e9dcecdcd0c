// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the agent crate.

use std::path::PathBuf;
use std::time::Duration;

/// Explicit config file: GANTRY_AGENT_CONFIG
pub fn config_path() -> Option<PathBuf> {
    std::env::var("GANTRY_AGENT_CONFIG").ok().map(PathBuf::from)
}

/// Dispatcher address: GANTRY_SERVER
pub fn server_address() -> Option<String> {
    std::env::var("GANTRY_SERVER").ok().filter(|s| !s.is_empty())
}

/// Agent working directory: GANTRY_AGENT_DIR
pub fn working_dir() -> Option<PathBuf> {
    std::env::var("GANTRY_AGENT_DIR").ok().map(PathBuf::from)
}

/// Keepalive interval override: GANTRY_KEEPALIVE_MS (zero is ignored)
pub fn keepalive_interval() -> Option<Duration> {
    std::env::var("GANTRY_KEEPALIVE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
