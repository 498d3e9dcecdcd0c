// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection handshake.
//!
//! Every accepted connection opens with exactly one [`Request`] frame. A
//! `Connect` that succeeds turns the connection into an envelope
//! [`Transport`](crate::Transport); the other requests are one-shot.

use gantry_core::AgentId;
use serde::{Deserialize, Serialize};

/// First frame sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Request {
    /// Liveness probe
    Status,

    /// Ask for an identity and credential material
    Register {
        hostname: String,
        /// Identity the agent already holds, if any
        #[serde(default)]
        uuid: Option<AgentId>,
        #[serde(default)]
        location: String,
        #[serde(default)]
        operating_system: String,
    },

    /// Upgrade this connection to a persistent agent transport
    Connect { agent_id: AgentId },
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Response {
    Status { marker: String },

    Registered { registration: Registration },

    /// Envelopes follow on this connection
    Connected,

    Error { message: String },
}

/// Credentials issued at registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub agent_id: AgentId,
    pub agent_private_key: String,
    pub agent_certificate: String,
}

/// Marker returned by the liveness probe.
pub const STATUS_OK: &str = "ok";

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
