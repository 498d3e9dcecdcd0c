// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gantry dispatcher library
//!
//! Accepts agent connections, keeps the registry of live agents, routes
//! work to them, and records the console output and status they report.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
mod env;
mod listener;
pub mod listeners;
pub mod registry;
pub mod reporter;
pub mod server;

pub use config::{BuildPaths, ConfigError, PathError, ServerConfig};
pub use listeners::{Listeners, StateListener};
pub use registry::{Registry, RegistryError};
pub use reporter::{Reporter, ReporterError};
pub use server::{DispatchError, LifecycleError, Server};

#[cfg(any(test, feature = "test-support"))]
pub use listeners::{RecordingListener, StateChange};
