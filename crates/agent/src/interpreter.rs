// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command tree interpreter.
//!
//! Walks a tree one node at a time in tree order. Each node's `runIf` is
//! judged against the outcome of its previous executed sibling, or the
//! context its parent was evaluated in for a first child. A composite
//! passes when every child that actually ran passed.
//!
//! Cancellation is cooperative: the session status is checked before each
//! node starts. A running leaf is never interrupted. When a node is aborted,
//! the nearest `onCancel` subtree (the node's own, else the closest
//! ancestor's) runs exactly once, in a fresh passing context with further
//! cancellation checks suspended.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use gantry_core::{AgentStatus, BuildResult, CommandNode, JobState};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::ops::{OpContext, Operations};
use crate::reporter::Reporter;

/// What happened to one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The node ran and passed or failed
    Ran(bool),
    /// `runIf` did not admit the prior outcome
    Skipped,
    /// Cancellation aborted the node or something inside it
    Cancelled {
        /// Whether an `onCancel` subtree has already run for this abort
        compensated: bool,
    },
}

type NodeFuture<'s> = Pin<Box<dyn Future<Output = Outcome> + Send + 's>>;

pub struct Interpreter<'a> {
    ops: &'a Operations,
    reporter: &'a dyn Reporter,
    status: watch::Receiver<AgentStatus>,
    root_dir: PathBuf,
    env: BTreeMap<String, String>,
}

impl<'a> Interpreter<'a> {
    /// `status` is the session status; `Cancelled` there aborts the walk.
    pub fn new(
        ops: &'a Operations,
        reporter: &'a dyn Reporter,
        status: watch::Receiver<AgentStatus>,
        root_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ops,
            reporter,
            status,
            root_dir: root_dir.into(),
            env: BTreeMap::new(),
        }
    }

    /// Run a whole build, reporting `Building` first and the result last.
    pub async fn run(&mut self, root: &CommandNode) -> BuildResult {
        self.reporter.status(JobState::Building);

        let dir = self.root_dir.clone();
        let outcome = self.run_node(root, true, dir, false).await;
        let result = match outcome {
            Outcome::Cancelled { .. } => BuildResult::Cancelled,
            Outcome::Ran(passed) => BuildResult::from_passed(passed),
            Outcome::Skipped => BuildResult::Passed,
        };

        info!(%result, nodes = root.node_count(), "command tree finished");
        self.reporter.completed(result);
        result
    }

    /// Variables exported so far.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    fn is_cancelled(&self) -> bool {
        self.status.borrow().is_cancelled()
    }

    fn run_node<'s>(
        &'s mut self,
        node: &'s CommandNode,
        prior_passed: bool,
        parent_dir: PathBuf,
        compensating: bool,
    ) -> NodeFuture<'s> {
        Box::pin(async move {
            if !compensating && self.is_cancelled() {
                debug!(kind = %node.name, "cancelled before start");
                return self.compensate(node, false, &parent_dir).await;
            }
            if !node.run_if.admits(prior_passed) {
                debug!(kind = %node.name, run_if = %node.run_if, prior_passed, "skipped");
                return Outcome::Skipped;
            }

            let dir = match &node.working_directory {
                Some(wd) => parent_dir.join(wd),
                None => parent_dir.clone(),
            };

            if !node.is_composite() {
                return Outcome::Ran(self.run_leaf(node, &dir).await);
            }

            let mut context = prior_passed;
            let mut all_passed = true;
            for child in &node.sub_commands {
                match self.run_node(child, context, dir.clone(), compensating).await {
                    Outcome::Ran(passed) => {
                        context = passed;
                        all_passed &= passed;
                    }
                    Outcome::Skipped => {}
                    Outcome::Cancelled { compensated } => {
                        return self.compensate(node, compensated, &parent_dir).await;
                    }
                }
            }
            Outcome::Ran(all_passed)
        })
    }

    /// Run `node`'s compensation subtree unless one already ran.
    async fn compensate(
        &mut self,
        node: &CommandNode,
        compensated: bool,
        parent_dir: &Path,
    ) -> Outcome {
        if compensated {
            return Outcome::Cancelled { compensated };
        }
        let Some(on_cancel) = &node.on_cancel else {
            return Outcome::Cancelled { compensated: false };
        };
        info!(kind = %node.name, "running cancel handler");
        let outcome = self
            .run_node(on_cancel, true, parent_dir.to_path_buf(), true)
            .await;
        debug!(?outcome, "cancel handler finished");
        Outcome::Cancelled { compensated: true }
    }

    async fn run_leaf(&mut self, node: &CommandNode, dir: &Path) -> bool {
        let Some(op) = self.ops.get(&node.name) else {
            warn!(kind = %node.name, "unknown command");
            self.reporter
                .console(&format!("unknown command: {}", node.name));
            return false;
        };

        let mut ctx = OpContext {
            node,
            dir,
            env: &mut self.env,
            reporter: self.reporter,
        };
        match op.run(&mut ctx).await {
            Ok(passed) => {
                debug!(kind = %node.name, passed, "node finished");
                passed
            }
            Err(e) => {
                warn!(kind = %node.name, error = %e, "node failed");
                self.reporter.console(&e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;
