// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identity and runtime state.
//!
//! An agent is a remote worker connected to the dispatcher. Its identity is
//! issued at registration and stays stable for the life of the connection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::build::BuildId;

crate::define_id! {
    /// Opaque identity of a registered agent.
    ///
    /// Unique among currently registered agents; never reused while an agent
    /// is live.
    pub struct AgentId;
}

/// Runtime status of an agent.
///
/// `LostContact` is only ever produced by the dispatcher when an agent's
/// transport goes away; agents themselves move between the other three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentStatus {
    #[default]
    Idle,
    Building,
    Cancelled,
    LostContact,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Idle => "Idle",
            AgentStatus::Building => "Building",
            AgentStatus::Cancelled => "Cancelled",
            AgentStatus::LostContact => "LostContact",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentStatus::Cancelled)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an agent names itself to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentIdentifier {
    pub host_name: String,
    pub ip_address: String,
    pub uuid: AgentId,
}

/// Snapshot of agent state carried by every `ping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRuntimeInfo {
    pub identifier: AgentIdentifier,
    pub runtime_status: AgentStatus,
    /// Agent working directory
    pub location: String,
    /// Free bytes on the volume holding the working directory
    pub usable_space: u64,
    pub operating_system: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cookie: String,
    /// Build currently executing, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<BuildId>,
}

impl AgentRuntimeInfo {
    pub fn agent_id(&self) -> &AgentId {
        &self.identifier.uuid
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
