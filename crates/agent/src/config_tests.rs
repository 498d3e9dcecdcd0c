// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear_env() {
    for var in [
        "GANTRY_AGENT_CONFIG",
        "GANTRY_SERVER",
        "GANTRY_AGENT_DIR",
        "GANTRY_KEEPALIVE_MS",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
fn defaults() {
    let config = AgentConfig::default();
    assert_eq!(config.server_address, DEFAULT_SERVER_ADDRESS);
    assert_eq!(config.keepalive_interval, Duration::from_secs(10));
    assert!(!config.hostname.is_empty());
    assert_eq!(config.uuid_file(), PathBuf::from("./config/guid.txt"));
}

#[test]
fn file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gantry-agent.toml");
    std::fs::write(
        &path,
        "server_address = \"ci.internal:8154\"\nhostname = \"builder-3\"\nkeepalive_ms = 250\n",
    )
    .unwrap();

    let config = AgentConfig::from_file(&path).unwrap();
    assert_eq!(config.server_address, "ci.internal:8154");
    assert_eq!(config.hostname, "builder-3");
    assert_eq!(config.keepalive_interval, Duration::from_millis(250));
    assert_eq!(config.working_dir, PathBuf::from("."));
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gantry-agent.toml");
    std::fs::write(&path, "server = \"typo\"\n").unwrap();

    let err = AgentConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.toml");
    std::fs::write(&path, "server_address = \"from-file:1\"\nkeepalive_ms = 100\n").unwrap();

    std::env::set_var("GANTRY_AGENT_CONFIG", &path);
    std::env::set_var("GANTRY_SERVER", "from-env:2");
    std::env::set_var("GANTRY_KEEPALIVE_MS", "50");
    std::env::set_var("GANTRY_AGENT_DIR", dir.path());

    let config = AgentConfig::load().unwrap();
    clear_env();

    assert_eq!(config.server_address, "from-env:2");
    assert_eq!(config.keepalive_interval, Duration::from_millis(50));
    assert_eq!(config.working_dir, dir.path());
}

#[test]
#[serial]
fn bad_keepalive_env_is_ignored() {
    for value in ["soon", "0", "-5"] {
        clear_env();
        std::env::set_var("GANTRY_AGENT_CONFIG", "/nonexistent/agent.toml");
        std::env::set_var("GANTRY_KEEPALIVE_MS", value);

        let config = AgentConfig::load().unwrap();
        clear_env();

        assert_eq!(config.keepalive_interval, DEFAULT_KEEPALIVE, "{value}");
    }
}

#[test]
fn zero_keepalive_in_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gantry-agent.toml");
    std::fs::write(&path, "keepalive_ms = 0\n").unwrap();

    let err = AgentConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "got {err:?}");
}

#[test]
fn uuid_is_generated_once_and_reused() {
    let dir = tempfile::tempdir().unwrap();
    let config = AgentConfig {
        working_dir: dir.path().to_path_buf(),
        ..AgentConfig::default()
    };

    assert_eq!(config.stored_uuid().unwrap(), None);
    let first = config.load_or_create_uuid().unwrap();
    let second = config.load_or_create_uuid().unwrap();
    assert_eq!(first, second);
    assert!(dir.path().join("config/guid.txt").is_file());
}

#[test]
fn stored_uuid_is_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    let config = AgentConfig {
        working_dir: dir.path().to_path_buf(),
        ..AgentConfig::default()
    };
    std::fs::create_dir_all(dir.path().join("config")).unwrap();
    std::fs::write(config.uuid_file(), "  agent-7\n").unwrap();

    assert_eq!(config.stored_uuid().unwrap(), Some(AgentId::new("agent-7")));
}

#[test]
fn store_uuid_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let config = AgentConfig {
        working_dir: dir.path().to_path_buf(),
        ..AgentConfig::default()
    };
    config.load_or_create_uuid().unwrap();
    config.store_uuid(&AgentId::new("issued")).unwrap();

    assert_eq!(config.load_or_create_uuid().unwrap(), AgentId::new("issued"));
}
