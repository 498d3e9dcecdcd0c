// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Receive loop for one connected agent.

use gantry_core::{Action, AgentId, AgentRuntimeInfo, AgentStatus, ConsoleOut, Envelope, StatusReport};
use gantry_wire::{Transport, TransportError};
use tracing::{debug, info, warn};

use super::Context;

/// Dispatcher-side view of one connected agent.
struct RemoteAgent {
    id: AgentId,
    last_status: Option<AgentStatus>,
}

/// Register the agent, consume its envelopes until the transport ends, then
/// tear down.
///
/// Listeners hear `LostContact` only when this connection still owned the
/// registry entry; a connection replaced by a reconnect ends quietly. The
/// transport is closed here only when the loop ended on an error.
///
/// A clean close by the peer returns `Ok(())`; anything else is returned as
/// the error that ended the loop.
pub(super) async fn serve_agent(
    ctx: &Context,
    agent_id: AgentId,
    transport: Transport,
) -> Result<(), TransportError> {
    let (sender, mut receiver) = transport.into_split();
    let connection = sender.connection_id();
    ctx.registry.register(agent_id.clone(), sender.clone());
    info!(agent = %agent_id, connection, "agent connected");

    let mut remote = RemoteAgent {
        id: agent_id,
        last_status: None,
    };

    let result = loop {
        match receiver.recv().await {
            Ok(Some(envelope)) => remote.handle(ctx, envelope).await,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    match ctx.registry.release(&remote.id, connection).await {
        Ok(true) => ctx
            .listeners
            .notify_agent(&remote.id, AgentStatus::LostContact),
        Ok(false) => debug!(agent = %remote.id, connection, "connection already replaced"),
        Err(e) => warn!(agent = %remote.id, connection, error = %e, "failed to release agent"),
    }
    match &result {
        Ok(()) => info!(agent = %remote.id, connection, "agent disconnected"),
        Err(e) => {
            warn!(agent = %remote.id, connection, error = %e, "agent connection failed");
            sender.close();
        }
    }
    result
}

impl RemoteAgent {
    async fn handle(&mut self, ctx: &Context, envelope: Envelope) {
        match envelope.action {
            Action::Ping => match envelope.payload::<AgentRuntimeInfo>() {
                Ok(info) => self.on_ping(ctx, info),
                Err(e) => warn!(agent = %self.id, error = %e, "malformed ping"),
            },

            Action::Console => match envelope.payload::<ConsoleOut>() {
                Ok(ConsoleOut {
                    build_id: Some(build_id),
                    text,
                }) => {
                    if let Err(e) = ctx.reporter.report_console(&build_id, &text).await {
                        warn!(agent = %self.id, build = %build_id, error = %e, "failed to record console output");
                    }
                }
                Ok(ConsoleOut { build_id: None, text }) => {
                    debug!(agent = %self.id, len = text.len(), "console output outside a build")
                }
                Err(e) => warn!(agent = %self.id, error = %e, "malformed console message"),
            },

            Action::ReportCurrentStatus | Action::ReportCompleting | Action::ReportCompleted => {
                match envelope.payload::<StatusReport>() {
                    Ok(report) => {
                        if let Err(e) = ctx.reporter.report_status(&report).await {
                            warn!(agent = %self.id, build = %report.build_id, error = %e, "failed to record build status");
                        }
                    }
                    Err(e) => warn!(agent = %self.id, error = %e, "malformed status report"),
                }
            }

            other => debug!(agent = %self.id, action = %other, "ignoring message"),
        }
    }

    fn on_ping(&mut self, ctx: &Context, info: AgentRuntimeInfo) {
        if info.agent_id() != &self.id {
            warn!(
                agent = %self.id,
                reported = %info.agent_id(),
                "ping identity does not match connection"
            );
            return;
        }
        let status = info.runtime_status;
        if self.last_status != Some(status) {
            debug!(agent = %self.id, %status, "agent status changed");
            self.last_status = Some(status);
            ctx.listeners.notify_agent(&self.id, status);
        }
    }
}
