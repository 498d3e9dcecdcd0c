// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gantry-core: data contract shared by the dispatcher and its agents

pub mod agent;
pub mod build;
pub mod command;
pub mod envelope;
pub mod id;

pub use agent::{AgentId, AgentIdentifier, AgentRuntimeInfo, AgentStatus};
pub use build::{Build, BuildId, BuildResult, JobState};
pub use command::{CommandNode, RunIf};
pub use envelope::{Action, ConsoleOut, Envelope, StatusReport};
pub use id::{random_id, ShortId};
