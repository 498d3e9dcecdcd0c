// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for accepting agent connections.
//!
//! Every connection is handled on its own task. The first frame is a
//! handshake [`Request`]; a successful `Connect` hands the connection to the
//! agent loop for the rest of its life.

mod agent;
mod register;

use std::sync::Arc;

use gantry_wire::codec::{read_frame, write_frame};
use gantry_wire::{ProtocolError, Request, Response, Transport, TransportError, DEFAULT_TIMEOUT, STATUS_OK};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::listeners::Listeners;
use crate::registry::Registry;
use crate::reporter::Reporter;

/// Shared state handed to every connection task.
#[derive(Clone)]
pub(crate) struct Context {
    pub config: Arc<ServerConfig>,
    pub registry: Registry,
    pub listeners: Listeners,
    pub reporter: Reporter,
}

/// Listener task for accepting socket connections.
pub(crate) struct Listener {
    socket: TcpListener,
    ctx: Context,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl Listener {
    pub fn new(socket: TcpListener, ctx: Context) -> Self {
        Self { socket, ctx }
    }

    /// Run the accept loop, spawning a task per connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, peer)) => {
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        debug!(%peer, "connection accepted");
                        if let Err(e) = handle_connection(stream, ctx).await {
                            match e {
                                ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
                                    debug!(%peer, "client disconnected")
                                }
                                ConnectionError::Protocol(ProtocolError::Timeout) => {
                                    warn!(%peer, "handshake timeout")
                                }
                                _ => error!(%peer, "connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single connection from handshake to close.
async fn handle_connection(mut stream: TcpStream, ctx: Context) -> Result<(), ConnectionError> {
    let request: Request = read_frame(&mut stream, DEFAULT_TIMEOUT).await?;

    match request {
        Request::Status => {
            let response = Response::Status {
                marker: STATUS_OK.to_string(),
            };
            write_frame(&mut stream, &response, DEFAULT_TIMEOUT).await?;
            Ok(())
        }

        Request::Register {
            hostname,
            uuid,
            location,
            operating_system,
        } => {
            info!(%hostname, %location, %operating_system, "registration request");
            let response = register::handle_register(&ctx.config, uuid).await;
            write_frame(&mut stream, &response, DEFAULT_TIMEOUT).await?;
            Ok(())
        }

        Request::Connect { agent_id } => {
            write_frame(&mut stream, &Response::Connected, DEFAULT_TIMEOUT).await?;
            agent::serve_agent(&ctx, agent_id, Transport::new(stream)).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
