// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `exec command=<program> args=<words>`: run a subprocess, streaming its output.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use super::{OpContext, OpError, Operation};

pub struct Exec;

#[async_trait]
impl Operation for Exec {
    async fn run(&self, ctx: &mut OpContext<'_>) -> Result<bool, OpError> {
        let program = ctx.require("command")?.to_string();
        let args: Vec<String> = ctx
            .node
            .arg("args")
            .map(|a| a.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        info!(command = %program, ?args, dir = %ctx.dir.display(), "exec");

        // The child is killed if the build future is dropped mid-run.
        let mut child = Command::new(&program)
            .args(&args)
            .current_dir(ctx.dir)
            .envs(ctx.env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OpError::Spawn {
                command: program.clone(),
                source,
            })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(OpError::Io {
                path: ctx.dir.to_path_buf(),
                source: std::io::Error::other("child output pipes unavailable"),
            });
        };

        let mut stdout = BufReader::new(stdout).lines();
        let mut stderr = BufReader::new(stderr).lines();
        let (mut out_open, mut err_open) = (true, true);

        while out_open || err_open {
            tokio::select! {
                line = stdout.next_line(), if out_open => match line {
                    Ok(Some(line)) => ctx.reporter.console(&line),
                    Ok(None) => out_open = false,
                    Err(e) => {
                        debug!(error = %e, "stdout read failed");
                        out_open = false;
                    }
                },
                line = stderr.next_line(), if err_open => match line {
                    Ok(Some(line)) => ctx.reporter.console(&line),
                    Ok(None) => err_open = false,
                    Err(e) => {
                        debug!(error = %e, "stderr read failed");
                        err_open = false;
                    }
                },
            }
        }

        let status = child.wait().await.map_err(|source| OpError::Io {
            path: ctx.dir.to_path_buf(),
            source,
        })?;
        if !status.success() {
            ctx.reporter.console(&format!("{program} exited with {status}"));
        }
        Ok(status.success())
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
