// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution session: one live connection to the dispatcher.
//!
//! Three activities share the session state:
//! - Keepalive task: pings on a fixed interval
//! - Reader task: decodes inbound envelopes, handles `cancelBuild` itself
//!   and forwards everything else
//! - Dispatch loop: runs one command tree at a time
//!
//! The dispatch loop is the only writer of Idle/Building. The reader may
//! flip Building to Cancelled, which the interpreter observes between nodes.
//! Every status change is followed immediately by a ping.

use std::sync::Arc;
use std::time::Duration;

use gantry_core::{Action, AgentStatus, Build, BuildId, BuildResult, CommandNode, Envelope};
use gantry_wire::{Transport, TransportError, TransportReceiver, TransportSender};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::{AgentConfig, DEFAULT_KEEPALIVE};
use crate::interpreter::Interpreter;
use crate::ops::Operations;
use crate::reporter::TransportReporter;
use crate::runtime_info::AgentProfile;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("reader task failed: {0}")]
    Reader(#[from] tokio::task::JoinError),
}

pub struct Session {
    config: AgentConfig,
    profile: AgentProfile,
    ops: Operations,
}

/// State shared between the session's tasks.
struct Shared {
    status: watch::Sender<AgentStatus>,
    cookie: Mutex<String>,
    build_id: Mutex<Option<BuildId>>,
    profile: AgentProfile,
    sender: TransportSender,
    /// Keeps snapshot-and-send atomic so pings leave in state order
    ping_lock: Mutex<()>,
}

impl Shared {
    fn ping(&self) {
        let _guard = self.ping_lock.lock();
        let info = self.profile.snapshot(
            *self.status.borrow(),
            &self.cookie.lock(),
            self.build_id.lock().as_ref(),
        );
        match Envelope::ping(&info) {
            Ok(envelope) => {
                if let Err(e) = self.sender.send(envelope) {
                    debug!(error = %e, "ping not sent");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode ping"),
        }
    }

    fn set_status(&self, status: AgentStatus) {
        self.status.send_replace(status);
        self.ping();
    }

    /// Building -> Cancelled; anything else is left alone.
    fn cancel(&self) -> bool {
        let flipped = self.status.send_if_modified(|status| {
            if *status == AgentStatus::Building {
                *status = AgentStatus::Cancelled;
                true
            } else {
                false
            }
        });
        if flipped {
            self.ping();
        }
        flipped
    }
}

impl Session {
    pub fn new(config: AgentConfig, profile: AgentProfile) -> Self {
        Self {
            config,
            profile,
            ops: Operations::builtin(),
        }
    }

    /// Replace the operation registry.
    pub fn with_operations(mut self, ops: Operations) -> Self {
        self.ops = ops;
        self
    }

    /// Serve `transport` until the dispatcher goes away.
    ///
    /// A clean end of stream returns `Ok(())`; anything else is an error.
    /// The transport is closed either way.
    pub async fn run(&self, transport: Transport) -> Result<(), SessionError> {
        let (sender, receiver) = transport.into_split();
        let (status, _) = watch::channel(AgentStatus::Idle);
        let shared = Arc::new(Shared {
            status,
            cookie: Mutex::new(String::new()),
            build_id: Mutex::new(None),
            profile: self.profile.clone(),
            sender,
            ping_lock: Mutex::new(()),
        });

        info!(agent = %self.profile.agent_id(), "session started");

        let keepalive = tokio::spawn(keepalive(
            Arc::clone(&shared),
            self.config.keepalive_interval,
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop(receiver, Arc::clone(&shared), tx));
        let _tasks = AbortOnDrop(vec![keepalive.abort_handle(), reader.abort_handle()]);

        while let Some(envelope) = rx.recv().await {
            self.dispatch(&shared, envelope).await;
        }

        keepalive.abort();
        let result = reader.await;
        shared.sender.close();

        match result? {
            Ok(()) => {
                info!("dispatcher closed the connection");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "session ended");
                Err(e.into())
            }
        }
    }

    async fn dispatch(&self, shared: &Shared, envelope: Envelope) {
        match envelope.action {
            Action::SetCookie => match envelope.payload::<String>() {
                Ok(cookie) => {
                    *shared.cookie.lock() = cookie;
                    debug!("cookie updated");
                }
                Err(e) => warn!(error = %e, "bad setCookie payload"),
            },
            Action::Cmd => match envelope.payload::<CommandNode>() {
                Ok(command) => {
                    self.execute(shared, None, &command).await;
                }
                Err(e) => warn!(error = %e, "bad cmd payload"),
            },
            Action::Build => match envelope.payload::<Build>() {
                Ok(build) => {
                    self.execute(shared, Some(build.build_id), &build.build_command)
                        .await;
                }
                Err(e) => warn!(error = %e, "bad build payload"),
            },
            other => debug!(action = %other, "ignoring envelope"),
        }
    }

    /// Run one command tree, holding the session in Building meanwhile.
    async fn execute(
        &self,
        shared: &Shared,
        build_id: Option<BuildId>,
        command: &CommandNode,
    ) -> BuildResult {
        let span = info_span!(
            "build",
            id = build_id.as_ref().map(|id| id.as_str()).unwrap_or("-")
        );

        *shared.build_id.lock() = build_id.clone();
        shared.set_status(AgentStatus::Building);

        let reporter = TransportReporter::new(shared.sender.clone(), build_id);
        let result = Interpreter::new(
            &self.ops,
            &reporter,
            shared.status.subscribe(),
            &self.config.working_dir,
        )
        .run(command)
        .instrument(span)
        .await;

        *shared.build_id.lock() = None;
        shared.set_status(AgentStatus::Idle);
        result
    }
}

/// Stops the helper tasks even if the session future is dropped mid-run.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

async fn keepalive(shared: Arc<Shared>, interval: Duration) {
    let interval = if interval.is_zero() {
        warn!(default = ?DEFAULT_KEEPALIVE, "zero keepalive interval, using default");
        DEFAULT_KEEPALIVE
    } else {
        interval
    };
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if shared.sender.is_closed() {
            break;
        }
        shared.ping();
    }
}

async fn read_loop(
    mut receiver: TransportReceiver,
    shared: Arc<Shared>,
    tx: mpsc::UnboundedSender<Envelope>,
) -> Result<(), TransportError> {
    while let Some(envelope) = receiver.recv().await? {
        if envelope.action == Action::CancelBuild {
            if shared.cancel() {
                info!("build cancelled");
            } else {
                debug!("cancel ignored, no build running");
            }
            continue;
        }
        if tx.send(envelope).is_err() {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
