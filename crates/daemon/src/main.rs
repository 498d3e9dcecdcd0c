// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gantry dispatcher daemon (gantryd)
//!
//! Architecture:
//! - Registry Task: sole owner of the agent table
//! - Listener Task: accepts connections, one task per agent
//! - Main: waits for a shutdown signal

use gantry_server::{LifecycleError, Server, ServerConfig};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("gantryd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("gantryd {}", env!("CARGO_PKG_VERSION"));
                println!("Gantry dispatcher - routes build commands to connected agents");
                println!();
                println!("USAGE:");
                println!("    gantryd");
                println!();
                println!("Configuration is read from $GANTRY_CONFIG (or ./gantry.toml) and");
                println!("GANTRY_ADDRESS, GANTRY_CERT_FILE, GANTRY_KEY_FILE, GANTRY_WORKING_DIR.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: gantryd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = ServerConfig::load()?;
    let _log_guard = setup_logging(&config)?;

    info!("Starting gantryd");

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start: {}", e);
            eprintln!("gantryd: {e}");
            return Err(e.into());
        }
    };
    let socket = server.bind().await?;

    let listener = server.clone();
    tokio::spawn(async move { listener.serve(socket).await });

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }

    info!("gantryd stopped");
    Ok(())
}

fn setup_logging(
    config: &ServerConfig,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_path = config.log_path();
    let dir = match log_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let file_name = log_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "gantryd.log".into());

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
