// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registration: issue an identity and credential material.

use gantry_core::{random_id, AgentId};
use gantry_wire::{Registration, Response};

use crate::config::ServerConfig;

// TODO: issue per-agent certificates; agents currently receive the server's own key pair.
pub(super) async fn handle_register(config: &ServerConfig, uuid: Option<AgentId>) -> Response {
    let agent_private_key = match tokio::fs::read_to_string(&config.key_file).await {
        Ok(key) => key,
        Err(e) => return internal_error("key", &config.key_file, e),
    };
    let agent_certificate = match tokio::fs::read_to_string(&config.cert_file).await {
        Ok(cert) => cert,
        Err(e) => return internal_error("certificate", &config.cert_file, e),
    };

    let agent_id = uuid
        .filter(|id| !id.as_str().is_empty())
        .unwrap_or_else(|| AgentId::new(random_id()));
    tracing::info!(agent = %agent_id, "issued registration");

    Response::Registered {
        registration: Registration {
            agent_id,
            agent_private_key,
            agent_certificate,
        },
    }
}

fn internal_error(kind: &str, path: &std::path::Path, e: std::io::Error) -> Response {
    tracing::error!(kind, path = %path.display(), error = %e, "registration failed");
    Response::Error {
        message: format!("internal error: could not read {kind}"),
    }
}
