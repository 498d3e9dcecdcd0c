// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::codec::{decode, encode};

#[test]
fn encode_decode_roundtrip_register() {
    let request = Request::Register {
        hostname: "worker-01".to_string(),
        uuid: Some(AgentId::new("a1")),
        location: "/var/lib/gantry".to_string(),
        operating_system: "linux".to_string(),
    };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn register_fields_default_when_absent() {
    let decoded: Request = decode(br#"{"type":"Register","hostname":"h"}"#).unwrap();
    assert_eq!(
        decoded,
        Request::Register {
            hostname: "h".to_string(),
            uuid: None,
            location: String::new(),
            operating_system: String::new(),
        }
    );
}

#[test]
fn registration_uses_camel_case() {
    let response = Response::Registered {
        registration: Registration {
            agent_id: AgentId::new("a1"),
            agent_private_key: "KEY".to_string(),
            agent_certificate: "CERT".to_string(),
        },
    };
    let json: serde_json::Value = serde_json::from_slice(&encode(&response).unwrap()).unwrap();
    assert_eq!(json["type"], "Registered");
    assert_eq!(json["registration"]["agentPrivateKey"], "KEY");
    assert_eq!(json["registration"]["agentId"], "a1");
}

#[test]
fn connect_and_status_tags() {
    let connect = encode(&Request::Connect {
        agent_id: AgentId::new("a1"),
    })
    .unwrap();
    assert_eq!(
        std::str::from_utf8(&connect).unwrap(),
        r#"{"type":"Connect","agent_id":"a1"}"#
    );
    assert_eq!(
        decode::<Request>(br#"{"type":"Status"}"#).unwrap(),
        Request::Status
    );
}
