// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build console and status sink.
//!
//! Console text is appended to `<working_dir>/<build_id>/console.log`.
//! Status reports are forwarded to state listeners, and terminal results
//! are written to `<working_dir>/<build_id>/result`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gantry_core::{BuildId, BuildResult, StatusReport};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::{BuildPaths, PathError};
use crate::listeners::Listeners;

/// Errors writing build records.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("corrupt result record for build {0}")]
    CorruptResult(BuildId),
}

/// Writes console and status records for builds.
#[derive(Clone)]
pub struct Reporter {
    paths: BuildPaths,
    listeners: Listeners,
    // Serializes appends so concurrent writers never interleave inside a record
    write_lock: Arc<Mutex<()>>,
}

impl Reporter {
    pub fn new(paths: BuildPaths, listeners: Listeners) -> Self {
        Self {
            paths,
            listeners,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn paths(&self) -> &BuildPaths {
        &self.paths
    }

    /// Append console text for a build.
    pub async fn report_console(&self, build_id: &BuildId, text: &str) -> Result<(), ReporterError> {
        let path = self.paths.console_log_file(build_id)?;
        let _guard = self.write_lock.lock().await;
        append_to_file(&path, text.as_bytes()).await
    }

    /// Persist terminal results, then notify listeners of the transition.
    ///
    /// A listener that sees a terminal state can read the result back.
    pub async fn report_status(&self, report: &StatusReport) -> Result<(), ReporterError> {
        if let Some(result) = report.result {
            let path = self.paths.result_file(&report.build_id)?;
            let _guard = self.write_lock.lock().await;
            write_file(&path, result.to_string().as_bytes()).await?;
            tracing::info!(build = %report.build_id, %result, "build completed");
        }

        self.listeners
            .notify_build(&report.build_id, &report.state());
        Ok(())
    }

    /// Read back the console log of a build.
    pub async fn console_log(&self, build_id: &BuildId) -> Result<String, ReporterError> {
        let path = self.paths.console_log_file(build_id)?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ReporterError::Io { path, source })
    }

    /// Terminal result of a build, if it has completed.
    pub async fn result(&self, build_id: &BuildId) -> Result<Option<BuildResult>, ReporterError> {
        let path = self.paths.result_file(build_id)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ReporterError::Io { path, source }),
        };
        let result = match text.trim() {
            "Passed" => BuildResult::Passed,
            "Failed" => BuildResult::Failed,
            "Cancelled" => BuildResult::Cancelled,
            _ => return Err(ReporterError::CorruptResult(build_id.clone())),
        };
        Ok(Some(result))
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ReporterError + '_ {
    move |source| ReporterError::Io {
        path: path.to_path_buf(),
        source,
    }
}

async fn ensure_parent(path: &Path) -> Result<(), ReporterError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_err(parent))?;
    }
    Ok(())
}

async fn append_to_file(path: &Path, data: &[u8]) -> Result<(), ReporterError> {
    ensure_parent(path).await?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_err(path))?;
    tracing::trace!(len = data.len(), path = %path.display(), "append");
    file.write_all(data).await.map_err(io_err(path))?;
    file.flush().await.map_err(io_err(path))
}

async fn write_file(path: &Path, data: &[u8]) -> Result<(), ReporterError> {
    ensure_parent(path).await?;
    tokio::fs::write(path, data).await.map_err(io_err(path))
}

#[cfg(test)]
#[path = "reporter_tests.rs"]
mod tests;
