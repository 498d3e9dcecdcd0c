// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime info snapshots carried by keepalive pings.

use std::path::Path;

use gantry_core::{AgentId, AgentIdentifier, AgentRuntimeInfo, AgentStatus, BuildId};
use tracing::debug;

use crate::config::AgentConfig;

/// The parts of a ping that do not change during a session.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub identifier: AgentIdentifier,
    pub location: String,
    pub operating_system: String,
}

impl AgentProfile {
    pub fn new(config: &AgentConfig, agent_id: AgentId, ip_address: impl Into<String>) -> Self {
        Self {
            identifier: AgentIdentifier {
                host_name: config.hostname.clone(),
                ip_address: ip_address.into(),
                uuid: agent_id,
            },
            location: config.working_dir.display().to_string(),
            operating_system: std::env::consts::OS.to_string(),
        }
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.identifier.uuid
    }

    /// Combine the profile with the session's current state.
    pub fn snapshot(
        &self,
        status: AgentStatus,
        cookie: &str,
        build_id: Option<&BuildId>,
    ) -> AgentRuntimeInfo {
        AgentRuntimeInfo {
            identifier: self.identifier.clone(),
            runtime_status: status,
            location: self.location.clone(),
            usable_space: usable_space(Path::new(&self.location)),
            operating_system: self.operating_system.clone(),
            cookie: cookie.to_string(),
            build_id: build_id.cloned(),
        }
    }
}

/// Free bytes on the volume holding `dir`; zero when it cannot be read.
pub fn usable_space(dir: &Path) -> u64 {
    match fs2::available_space(dir) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "could not read usable space");
            0
        }
    }
}

#[cfg(test)]
#[path = "runtime_info_tests.rs"]
mod tests;
