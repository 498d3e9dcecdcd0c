// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry and message router.
//!
//! One coordinating task owns the table mapping agent identity to the send
//! side of its transport. Every registration, removal and routed send is a
//! command on a single channel, so mutations apply in the order callers
//! issued them and nothing else ever touches the table.

use std::collections::HashMap;

use gantry_core::{AgentId, Envelope};
use gantry_wire::{ConnectionId, TransportError, TransportSender};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Errors from registry queries.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry task has stopped")]
    Stopped,
}

enum Command {
    Add {
        id: AgentId,
        transport: TransportSender,
    },
    Remove {
        id: AgentId,
    },
    Release {
        id: AgentId,
        connection: ConnectionId,
        reply: oneshot::Sender<bool>,
    },
    Route {
        id: AgentId,
        envelope: Envelope,
    },
    List {
        reply: oneshot::Sender<Vec<AgentId>>,
    },
}

/// Handle to the registry task. Cheap to clone.
#[derive(Clone)]
pub struct Registry {
    tx: mpsc::UnboundedSender<Command>,
}

impl Registry {
    /// Spawn the coordinating task on the current runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(manage_agents(rx));
        Self { tx }
    }

    /// Add or replace the entry for `id`.
    pub fn register(&self, id: AgentId, transport: TransportSender) {
        self.submit(Command::Add { id, transport });
    }

    /// Remove the entry for `id` if present.
    pub fn unregister(&self, id: &AgentId) {
        self.submit(Command::Remove { id: id.clone() });
    }

    /// Remove the entry for `id` only if it still belongs to `connection`.
    ///
    /// Used on connection teardown so a stale connection closing late cannot
    /// evict the connection that replaced it. Returns whether the entry was
    /// removed; `false` means a newer connection owns the identity (or none
    /// does).
    pub async fn release(
        &self,
        id: &AgentId,
        connection: ConnectionId,
    ) -> Result<bool, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Release {
                id: id.clone(),
                connection,
                reply,
            })
            .map_err(|_| RegistryError::Stopped)?;
        rx.await.map_err(|_| RegistryError::Stopped)
    }

    /// Forward `envelope` to the agent's transport.
    ///
    /// Best effort: an unknown or vanished agent is logged and the envelope
    /// dropped. Never blocks.
    pub fn route(&self, id: &AgentId, envelope: Envelope) {
        self.submit(Command::Route {
            id: id.clone(),
            envelope,
        });
    }

    /// Identities currently registered, sorted.
    pub async fn agents(&self) -> Result<Vec<AgentId>, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::List { reply })
            .map_err(|_| RegistryError::Stopped)?;
        rx.await.map_err(|_| RegistryError::Stopped)
    }

    fn submit(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("registry task has stopped, dropping command");
        }
    }
}

async fn manage_agents(mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut agents: HashMap<AgentId, TransportSender> = HashMap::new();

    while let Some(command) = rx.recv().await {
        match command {
            Command::Add { id, transport } => {
                let connection = transport.connection_id();
                if let Some(previous) = agents.insert(id.clone(), transport) {
                    info!(
                        agent = %id,
                        connection,
                        replaced = previous.connection_id(),
                        "agent re-registered"
                    );
                } else {
                    info!(agent = %id, connection, "agent registered");
                }
            }
            Command::Remove { id } => {
                if agents.remove(&id).is_some() {
                    info!(agent = %id, "agent unregistered");
                }
            }
            Command::Release {
                id,
                connection,
                reply,
            } => {
                let released = match agents.get(&id) {
                    Some(entry) if entry.connection_id() == connection => {
                        agents.remove(&id);
                        info!(agent = %id, connection, "agent released");
                        true
                    }
                    Some(entry) => {
                        debug!(
                            agent = %id,
                            connection,
                            current = entry.connection_id(),
                            "stale release ignored"
                        );
                        false
                    }
                    None => false,
                };
                let _ = reply.send(released);
            }
            Command::Route { id, envelope } => match agents.get(&id) {
                Some(transport) => {
                    let action = envelope.action;
                    match transport.send(envelope) {
                        Ok(()) => debug!(agent = %id, %action, "routed message"),
                        Err(TransportError::Closed) => {
                            warn!(agent = %id, %action, "agent transport closed, dropping message")
                        }
                        Err(e) => warn!(agent = %id, %action, error = %e, "failed to route message"),
                    }
                }
                None => warn!(
                    agent = %id,
                    action = %envelope.action,
                    "could not find agent for sending message"
                ),
            },
            Command::List { reply } => {
                let mut ids: Vec<AgentId> = agents.keys().cloned().collect();
                ids.sort();
                let _ = reply.send(ids);
            }
        }
    }

    debug!("registry task stopped");
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
