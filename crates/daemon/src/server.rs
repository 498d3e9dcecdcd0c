// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher startup and the handle used to drive connected agents.

use std::path::PathBuf;
use std::sync::Arc;

use gantry_core::{AgentId, Build, BuildId, BuildResult, CommandNode, Envelope};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{BuildPaths, ServerConfig};
use crate::listener::{Context, Listener};
use crate::listeners::{Listeners, StateListener};
use crate::registry::{Registry, RegistryError};
use crate::reporter::{Reporter, ReporterError};

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("missing {kind} file: {path}")]
    MissingCredential { kind: &'static str, path: PathBuf },

    #[error("Failed to bind {0}: {1}")]
    BindFailed(String, std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from dispatching work.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Dispatcher handle. Cheap to clone.
#[derive(Clone)]
pub struct Server {
    config: Arc<ServerConfig>,
    registry: Registry,
    listeners: Listeners,
    reporter: Reporter,
}

impl Server {
    /// Validate configuration and start the registry task.
    ///
    /// Missing certificate or key files abort startup.
    pub fn new(config: ServerConfig) -> Result<Self, LifecycleError> {
        for (kind, path) in [("certificate", &config.cert_file), ("key", &config.key_file)] {
            if !path.is_file() {
                return Err(LifecycleError::MissingCredential {
                    kind,
                    path: path.clone(),
                });
            }
        }
        std::fs::create_dir_all(&config.working_dir)?;

        let listeners = Listeners::new();
        let reporter = Reporter::new(config.build_paths(), listeners.clone());
        Ok(Self {
            config: Arc::new(config),
            registry: Registry::spawn(),
            listeners,
            reporter,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, LifecycleError> {
        let socket = TcpListener::bind(&self.config.address)
            .await
            .map_err(|e| LifecycleError::BindFailed(self.config.address.clone(), e))?;
        info!(address = %self.config.address, "listening");
        Ok(socket)
    }

    /// Accept connections on `socket` until the task is dropped.
    pub async fn serve(&self, socket: TcpListener) {
        let ctx = Context {
            config: Arc::clone(&self.config),
            registry: self.registry.clone(),
            listeners: self.listeners.clone(),
            reporter: self.reporter.clone(),
        };
        Listener::new(socket, ctx).run().await;
    }

    /// Register a collaborator for `(class, id, state)` notifications.
    pub fn add_listener(&self, listener: Arc<dyn StateListener>) {
        self.listeners.add(listener);
    }

    /// Route an envelope to an agent (best effort).
    pub fn send(&self, agent: &AgentId, envelope: Envelope) {
        self.registry.route(agent, envelope);
    }

    /// Wrap `command` as build `build_id` and send it to `agent`.
    pub fn send_build(
        &self,
        agent: &AgentId,
        build_id: impl Into<BuildId>,
        command: CommandNode,
    ) -> Result<(), DispatchError> {
        let build = Build::new(build_id, command);
        info!(agent = %agent, build = %build.build_id, nodes = build.build_command.node_count(), "dispatching build");
        self.send(agent, Envelope::build(&build)?);
        Ok(())
    }

    /// Send a bare command tree to `agent`.
    pub fn send_command(&self, agent: &AgentId, command: &CommandNode) -> Result<(), DispatchError> {
        self.send(agent, Envelope::cmd(command)?);
        Ok(())
    }

    pub fn cancel_build(&self, agent: &AgentId) {
        self.send(agent, Envelope::cancel_build());
    }

    pub fn set_cookie(&self, agent: &AgentId, cookie: &str) {
        self.send(agent, Envelope::set_cookie(cookie));
    }

    pub async fn agents(&self) -> Result<Vec<AgentId>, RegistryError> {
        self.registry.agents().await
    }

    pub async fn console_log(&self, build_id: &BuildId) -> Result<String, ReporterError> {
        self.reporter.console_log(build_id).await
    }

    pub async fn build_result(
        &self,
        build_id: &BuildId,
    ) -> Result<Option<BuildResult>, ReporterError> {
        self.reporter.result(build_id).await
    }

    pub fn paths(&self) -> &BuildPaths {
        self.reporter.paths()
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
