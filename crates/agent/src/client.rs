// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handshake client for talking to the dispatcher.

use gantry_core::AgentId;
use gantry_wire::codec::{read_frame, write_frame};
use gantry_wire::{ProtocolError, Registration, Request, Response, Transport, DEFAULT_TIMEOUT};
use thiserror::Error;
use tokio::net::TcpStream;
use tracing::info;

use crate::config::AgentConfig;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("server rejected request: {0}")]
    Rejected(String),

    #[error("unexpected response to {0}")]
    UnexpectedResponse(&'static str),
}

/// An established agent transport.
pub struct Connection {
    pub transport: Transport,
    /// Local address of the socket, reported in pings
    pub local_ip: String,
}

async fn dial(addr: &str) -> Result<TcpStream, ClientError> {
    TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })
}

async fn request(addr: &str, request: &Request) -> Result<(TcpStream, Response), ClientError> {
    let mut stream = dial(addr).await?;
    write_frame(&mut stream, request, DEFAULT_TIMEOUT).await?;
    let response = read_frame(&mut stream, DEFAULT_TIMEOUT).await?;
    Ok((stream, response))
}

/// Liveness probe; returns the server's marker.
pub async fn status(addr: &str) -> Result<String, ClientError> {
    match request(addr, &Request::Status).await?.1 {
        Response::Status { marker } => Ok(marker),
        Response::Error { message } => Err(ClientError::Rejected(message)),
        _ => Err(ClientError::UnexpectedResponse("status")),
    }
}

/// Obtain credentials, keeping `uuid` when the agent already has one.
pub async fn register(
    config: &AgentConfig,
    uuid: Option<AgentId>,
) -> Result<Registration, ClientError> {
    let req = Request::Register {
        hostname: config.hostname.clone(),
        uuid,
        location: config.working_dir.display().to_string(),
        operating_system: std::env::consts::OS.to_string(),
    };
    match request(&config.server_address, &req).await?.1 {
        Response::Registered { registration } => {
            info!(agent = %registration.agent_id, "registered");
            Ok(registration)
        }
        Response::Error { message } => Err(ClientError::Rejected(message)),
        _ => Err(ClientError::UnexpectedResponse("register")),
    }
}

/// Open the persistent transport for `agent_id`.
pub async fn connect(addr: &str, agent_id: &AgentId) -> Result<Connection, ClientError> {
    let req = Request::Connect {
        agent_id: agent_id.clone(),
    };
    let (stream, response) = request(addr, &req).await?;
    match response {
        Response::Connected => {
            let local_ip = stream
                .local_addr()
                .map(|addr| addr.ip().to_string())
                .unwrap_or_default();
            info!(agent = %agent_id, %addr, "connected");
            Ok(Connection {
                transport: Transport::new(stream),
                local_ip,
            })
        }
        Response::Error { message } => Err(ClientError::Rejected(message)),
        _ => Err(ClientError::UnexpectedResponse("connect")),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
