// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn info(status: AgentStatus) -> AgentRuntimeInfo {
    AgentRuntimeInfo {
        identifier: AgentIdentifier {
            host_name: "worker-01".to_string(),
            ip_address: "10.0.0.7".to_string(),
            uuid: AgentId::new("a1"),
        },
        runtime_status: status,
        location: "/var/lib/gantry".to_string(),
        usable_space: 5_000_000_000,
        operating_system: "linux".to_string(),
        cookie: String::new(),
        build_id: None,
    }
}

#[yare::parameterized(
    idle         = { AgentStatus::Idle, "Idle" },
    building     = { AgentStatus::Building, "Building" },
    cancelled    = { AgentStatus::Cancelled, "Cancelled" },
    lost_contact = { AgentStatus::LostContact, "LostContact" },
)]
fn status_display_matches_wire_name(status: AgentStatus, name: &str) {
    assert_eq!(status.to_string(), name);
    assert_eq!(serde_json::to_string(&status).unwrap(), format!("\"{name}\""));
}

#[test]
fn runtime_info_uses_camel_case_fields() {
    let json = serde_json::to_value(info(AgentStatus::Building)).unwrap();
    assert_eq!(json["identifier"]["hostName"], "worker-01");
    assert_eq!(json["runtimeStatus"], "Building");
    assert_eq!(json["usableSpace"], 5_000_000_000u64);
    assert!(json.get("cookie").is_none());
    assert!(json.get("buildId").is_none());
}

#[test]
fn runtime_info_exposes_agent_id() {
    assert_eq!(info(AgentStatus::Idle).agent_id(), "a1");
}

#[test]
fn only_cancelled_is_cancelled() {
    assert!(AgentStatus::Cancelled.is_cancelled());
    assert!(!AgentStatus::Building.is_cancelled());
    assert_eq!(AgentStatus::default(), AgentStatus::Idle);
}
