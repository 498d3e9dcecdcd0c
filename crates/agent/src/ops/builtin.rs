// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in operations that need no subprocess.

use async_trait::async_trait;
use gantry_core::JobState;

use super::{OpContext, OpError, Operation};

/// `echo line=<text>`: print a line.
pub struct Echo;

#[async_trait]
impl Operation for Echo {
    async fn run(&self, ctx: &mut OpContext<'_>) -> Result<bool, OpError> {
        let line = ctx.node.arg("line").unwrap_or_default();
        ctx.reporter.console(line);
        Ok(true)
    }
}

/// `fail message=<text>`: print the message, if non-empty, and fail.
pub struct Fail;

#[async_trait]
impl Operation for Fail {
    async fn run(&self, ctx: &mut OpContext<'_>) -> Result<bool, OpError> {
        if let Some(message) = ctx.node.arg("message").filter(|m| !m.is_empty()) {
            ctx.reporter.console(message);
        }
        Ok(false)
    }
}

/// `export name=<var> value=<text>`: set a variable for later `exec` nodes.
pub struct Export;

#[async_trait]
impl Operation for Export {
    async fn run(&self, ctx: &mut OpContext<'_>) -> Result<bool, OpError> {
        let name = ctx.require("name")?.to_string();
        if name.is_empty() || name.contains('=') {
            return Err(OpError::InvalidArg {
                kind: ctx.node.name.clone(),
                arg: "name",
                reason: format!("'{name}' is not a variable name"),
            });
        }
        let value = ctx.node.arg("value").unwrap_or_default().to_string();
        ctx.env.insert(name, value);
        Ok(true)
    }
}

/// `mkdirs path=<dir>`: create a directory (and parents) under the node's dir.
pub struct Mkdirs;

#[async_trait]
impl Operation for Mkdirs {
    async fn run(&self, ctx: &mut OpContext<'_>) -> Result<bool, OpError> {
        let path = ctx.dir.join(ctx.require("path")?);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| OpError::Io { path, source })?;
        Ok(true)
    }
}

/// `reportCurrentStatus status=<JobState>`
pub struct ReportStatus;

#[async_trait]
impl Operation for ReportStatus {
    async fn run(&self, ctx: &mut OpContext<'_>) -> Result<bool, OpError> {
        let state = ctx
            .require("status")?
            .parse::<JobState>()
            .map_err(|reason| OpError::InvalidArg {
                kind: ctx.node.name.clone(),
                arg: "status",
                reason,
            })?;
        ctx.reporter.status(state);
        Ok(true)
    }
}

/// `reportCompleting`
pub struct ReportCompleting;

#[async_trait]
impl Operation for ReportCompleting {
    async fn run(&self, ctx: &mut OpContext<'_>) -> Result<bool, OpError> {
        ctx.reporter.status(JobState::Completing);
        Ok(true)
    }
}
