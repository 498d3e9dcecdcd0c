// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message envelope: the unit exchanged over an agent transport.
//!
//! An envelope is an action tag plus a structured payload whose shape is
//! fixed by the action. Envelopes are immutable once built.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agent::AgentRuntimeInfo;
use crate::build::{Build, BuildId, BuildResult, JobState};
use crate::command::CommandNode;

/// Envelope action vocabulary.
///
/// Tags this build does not know decode as [`Action::Unknown`] so newer
/// peers can add actions without breaking older ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// agent -> server keepalive carrying [`AgentRuntimeInfo`]
    Ping,
    /// server -> agent bare command tree
    Cmd,
    /// server -> agent [`Build`]
    Build,
    /// server -> agent request to cancel the running build
    CancelBuild,
    /// server -> agent session token
    SetCookie,
    /// agent -> server [`StatusReport`]
    ReportCurrentStatus,
    /// agent -> server [`StatusReport`]
    ReportCompleting,
    /// agent -> server [`StatusReport`] with a result
    ReportCompleted,
    /// agent -> server [`ConsoleOut`]
    Console,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Ping => "ping",
            Action::Cmd => "cmd",
            Action::Build => "build",
            Action::CancelBuild => "cancelBuild",
            Action::SetCookie => "setCookie",
            Action::ReportCurrentStatus => "reportCurrentStatus",
            Action::ReportCompleting => "reportCompleting",
            Action::ReportCompleted => "reportCompleted",
            Action::Console => "console",
            Action::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Action tag plus payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub action: Action,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Console text produced while running a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleOut {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<BuildId>,
    pub text: String,
}

/// Build progress (and, once completed, result).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub build_id: BuildId,
    pub job_state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<BuildResult>,
}

impl StatusReport {
    /// The state listeners see: the result once present, otherwise the job state.
    pub fn state(&self) -> String {
        match self.result {
            Some(result) => result.to_string(),
            None => self.job_state.to_string(),
        }
    }
}

impl Envelope {
    /// Build an envelope from any serializable payload.
    pub fn new<T: Serialize>(action: Action, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            action,
            data: serde_json::to_value(payload)?,
        })
    }

    /// Decode the payload as `T`.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }

    pub fn ping(info: &AgentRuntimeInfo) -> Result<Self, serde_json::Error> {
        Self::new(Action::Ping, info)
    }

    pub fn cmd(command: &CommandNode) -> Result<Self, serde_json::Error> {
        Self::new(Action::Cmd, command)
    }

    pub fn build(build: &Build) -> Result<Self, serde_json::Error> {
        Self::new(Action::Build, build)
    }

    pub fn cancel_build() -> Self {
        Self {
            action: Action::CancelBuild,
            data: serde_json::Value::Null,
        }
    }

    pub fn set_cookie(cookie: &str) -> Self {
        Self {
            action: Action::SetCookie,
            data: serde_json::Value::String(cookie.to_string()),
        }
    }

    pub fn console(build_id: Option<&BuildId>, text: &str) -> Result<Self, serde_json::Error> {
        Self::new(
            Action::Console,
            &ConsoleOut {
                build_id: build_id.cloned(),
                text: text.to_string(),
            },
        )
    }

    pub fn status(report: &StatusReport) -> Result<Self, serde_json::Error> {
        let action = match (report.job_state, report.result) {
            (_, Some(_)) | (JobState::Completed, _) => Action::ReportCompleted,
            (JobState::Completing, None) => Action::ReportCompleting,
            _ => Action::ReportCurrentStatus,
        };
        Self::new(action, report)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
