// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the server crate.

use std::path::PathBuf;

/// Explicit config file: GANTRY_CONFIG
pub fn config_path() -> Option<PathBuf> {
    std::env::var("GANTRY_CONFIG").ok().map(PathBuf::from)
}

/// Listen address override: GANTRY_ADDRESS
pub fn address() -> Option<String> {
    std::env::var("GANTRY_ADDRESS").ok().filter(|s| !s.is_empty())
}

/// Certificate PEM override: GANTRY_CERT_FILE
pub fn cert_file() -> Option<PathBuf> {
    std::env::var("GANTRY_CERT_FILE").ok().map(PathBuf::from)
}

/// Private key PEM override: GANTRY_KEY_FILE
pub fn key_file() -> Option<PathBuf> {
    std::env::var("GANTRY_KEY_FILE").ok().map(PathBuf::from)
}

/// Build storage root override: GANTRY_WORKING_DIR
pub fn working_dir() -> Option<PathBuf> {
    std::env::var("GANTRY_WORKING_DIR").ok().map(PathBuf::from)
}
