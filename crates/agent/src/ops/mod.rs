// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation registry: what each leaf command kind does.

mod builtin;
mod exec;

pub use builtin::{Echo, Export, Fail, Mkdirs, ReportCompleting, ReportStatus};
pub use exec::Exec;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use gantry_core::CommandNode;
use thiserror::Error;

use crate::reporter::Reporter;

/// Errors from running a single operation.
///
/// The interpreter turns every one of these into a failed outcome.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("{kind}: missing argument '{arg}'")]
    MissingArg { kind: String, arg: &'static str },

    #[error("{kind}: invalid argument '{arg}': {reason}")]
    InvalidArg {
        kind: String,
        arg: &'static str,
        reason: String,
    },

    #[error("{command}: failed to start: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything an operation may touch while it runs.
pub struct OpContext<'a> {
    pub node: &'a CommandNode,
    /// Resolved working directory for this node
    pub dir: &'a Path,
    /// Variables exported so far in this build
    pub env: &'a mut BTreeMap<String, String>,
    pub reporter: &'a dyn Reporter,
}

impl OpContext<'_> {
    /// Required argument of the current node.
    pub fn require(&self, arg: &'static str) -> Result<&str, OpError> {
        self.node.arg(arg).ok_or_else(|| OpError::MissingArg {
            kind: self.node.name.clone(),
            arg,
        })
    }
}

/// One leaf command kind.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Run the node; `Ok(false)` is an ordinary failure.
    async fn run(&self, ctx: &mut OpContext<'_>) -> Result<bool, OpError>;
}

/// Operations keyed by command kind.
#[derive(Clone, Default)]
pub struct Operations {
    ops: HashMap<String, Arc<dyn Operation>>,
}

impl Operations {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in kind.
    pub fn builtin() -> Self {
        let mut ops = Self::new();
        ops.register("echo", Echo);
        ops.register("fail", Fail);
        ops.register("exec", Exec);
        ops.register("export", Export);
        ops.register("mkdirs", Mkdirs);
        ops.register("reportCurrentStatus", ReportStatus);
        ops.register("reportCompleting", ReportCompleting);
        ops
    }

    /// Add or replace the operation for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, op: impl Operation + 'static) {
        self.ops.insert(kind.into(), Arc::new(op));
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn Operation>> {
        self.ops.get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.ops.contains_key(kind)
    }
}

#[cfg(test)]
#[path = "../ops_tests.rs"]
mod tests;
