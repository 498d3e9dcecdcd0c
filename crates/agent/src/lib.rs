// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gantry agent library
//!
//! Connects to the dispatcher, keeps it informed with pings, and runs the
//! command trees it sends.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod client;
pub mod config;
mod env;
pub mod interpreter;
pub mod ops;
pub mod reporter;
pub mod runtime_info;
pub mod session;

pub use client::{ClientError, Connection};
pub use config::{AgentConfig, ConfigError};
pub use interpreter::{Interpreter, Outcome};
pub use ops::{OpContext, OpError, Operation, Operations};
pub use reporter::{Reporter, TransportReporter};
pub use runtime_info::AgentProfile;
pub use session::{Session, SessionError};

#[cfg(any(test, feature = "test-support"))]
pub use reporter::{FakeReporter, ReportCall};
