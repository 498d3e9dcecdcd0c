// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command tree: the recursive description of work sent to an agent.
//!
//! A tree is decoded once per dispatch and walked read-only by the agent's
//! interpreter. Nodes own their children, so cycles cannot be expressed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind used for pure container nodes.
pub const COMPOSE: &str = "compose";

/// Condition under which a node runs, judged against the prior outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunIf {
    /// Run only if the prior outcome succeeded
    #[default]
    Passed,
    /// Run only if the prior outcome failed
    Failed,
    /// Always run
    Any,
}

impl RunIf {
    /// Whether a node with this condition runs after an outcome of `prior_passed`.
    pub fn admits(self, prior_passed: bool) -> bool {
        match self {
            RunIf::Passed => prior_passed,
            RunIf::Failed => !prior_passed,
            RunIf::Any => true,
        }
    }
}

impl fmt::Display for RunIf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunIf::Passed => write!(f, "passed"),
            RunIf::Failed => write!(f, "failed"),
            RunIf::Any => write!(f, "any"),
        }
    }
}

/// One node of a command tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandNode {
    /// Operation kind, e.g. `echo`, `exec`, `compose`
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,
    #[serde(default, rename = "runIfConfig")]
    pub run_if: RunIf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_commands: Vec<CommandNode>,
    /// Compensation subtree run when cancellation interrupts this node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_cancel: Option<Box<CommandNode>>,
    /// Directory (relative to the agent working dir) the node runs in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

impl CommandNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: BTreeMap::new(),
            run_if: RunIf::default(),
            sub_commands: Vec::new(),
            on_cancel: None,
            working_directory: None,
        }
    }

    /// Container node running `children` in order.
    pub fn compose(children: impl IntoIterator<Item = CommandNode>) -> Self {
        Self {
            sub_commands: children.into_iter().collect(),
            ..Self::new(COMPOSE)
        }
    }

    pub fn echo(line: impl Into<String>) -> Self {
        Self::new("echo").with_arg("line", line)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new("fail").with_arg("message", message)
    }

    /// Run an external program; `args` is split on whitespace by the agent.
    pub fn exec(command: impl Into<String>, args: &[&str]) -> Self {
        let node = Self::new("exec").with_arg("command", command);
        if args.is_empty() {
            node
        } else {
            node.with_arg("args", args.join(" "))
        }
    }

    pub fn report_status(state: crate::build::JobState) -> Self {
        Self::new("reportCurrentStatus").with_arg("status", state.to_string())
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn with_run_if(mut self, run_if: RunIf) -> Self {
        self.run_if = run_if;
        self
    }

    pub fn with_on_cancel(mut self, node: CommandNode) -> Self {
        self.on_cancel = Some(Box::new(node));
        self
    }

    pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// Whether this node is evaluated by walking children rather than by an operation.
    pub fn is_composite(&self) -> bool {
        !self.sub_commands.is_empty() || self.name == COMPOSE
    }

    /// Number of nodes in the tree, compensation subtrees included.
    pub fn node_count(&self) -> usize {
        1 + self
            .sub_commands
            .iter()
            .map(CommandNode::node_count)
            .sum::<usize>()
            + self.on_cancel.as_ref().map_or(0, |n| n.node_count())
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (k, v) in &self.args {
            write!(f, " {k}={v:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
