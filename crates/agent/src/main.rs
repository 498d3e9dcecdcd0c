// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gantry build agent
//!
//! Registers with the dispatcher, opens the agent transport, and serves
//! builds until the connection drops, then reconnects.

use std::time::Duration;

use gantry_agent::{client, AgentConfig, AgentProfile, Session};
use tracing::{error, info, warn};

/// Delay before reconnecting after a lost connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("gantry-agent {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("gantry-agent {}", env!("CARGO_PKG_VERSION"));
                println!("Gantry build agent - runs command trees sent by gantryd");
                println!();
                println!("USAGE:");
                println!("    gantry-agent");
                println!();
                println!("Configuration is read from $GANTRY_AGENT_CONFIG (or ./gantry-agent.toml)");
                println!("and GANTRY_SERVER, GANTRY_AGENT_DIR, GANTRY_KEEPALIVE_MS.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: gantry-agent [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    setup_logging();
    let config = AgentConfig::load()?;
    info!(server = %config.server_address, dir = %config.working_dir.display(), "starting agent");

    loop {
        tokio::select! {
            result = serve_once(&config) => match result {
                Ok(()) => info!("connection closed"),
                Err(e) => warn!(error = %e, "connection lost"),
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                return Ok(());
            }
        }
        info!(delay_secs = RECONNECT_DELAY.as_secs(), "reconnecting");
        tokio::select! {
            _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

/// One register/connect/serve cycle.
async fn serve_once(config: &AgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    let uuid = config.load_or_create_uuid()?;
    let registration = client::register(config, Some(uuid)).await?;
    if let Err(e) = config.store_uuid(&registration.agent_id) {
        error!(error = %e, "could not persist agent identity");
    }

    let conn = client::connect(&config.server_address, &registration.agent_id).await?;
    let profile = AgentProfile::new(config, registration.agent_id, conn.local_ip);
    Session::new(config.clone(), profile)
        .run(conn.transport)
        .await?;
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
