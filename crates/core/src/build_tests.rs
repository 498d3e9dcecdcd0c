// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn build_derives_paths_from_id() {
    let build = Build::new("b1", CommandNode::echo("hi"));
    assert_eq!(build.build_locator, "/builds/b1");
    assert_eq!(build.console_url, "/console/builds/b1");
    assert_eq!(build.artifact_upload_base_url, "/artifacts/builds/b1");
    assert_eq!(build.property_base_url, "/properties/builds/b1");
}

#[test]
fn distinct_ids_never_share_paths() {
    let a = BuildId::new("b1");
    let b = BuildId::new("b10");
    assert_ne!(a.console_url(), b.console_url());
    assert_ne!(a.artifacts_url(), b.artifacts_url());
    assert_ne!(a.properties_url(), b.properties_url());
}

#[test]
fn artifact_url_carries_file_query() {
    assert_eq!(
        BuildId::new("b1").artifact_url("out.tar"),
        "/artifacts/builds/b1?file=out.tar"
    );
}

#[yare::parameterized(
    console  = { "/console/builds/b7", Some("b7") },
    artifact = { "/artifacts/builds/b7?file=x.txt", Some("b7") },
    bare     = { "b7", Some("b7") },
    trailing = { "/console/builds/", None },
)]
fn build_id_from_path(path: &str, expected: Option<&str>) {
    assert_eq!(BuildId::from_path(path), expected.map(BuildId::new));
}

#[test]
fn build_wire_names_follow_protocol() {
    let json = serde_json::to_value(Build::new("b1", CommandNode::echo("hi"))).unwrap();
    assert_eq!(json["buildId"], "b1");
    assert_eq!(json["consoleURI"], "/console/builds/b1");
    assert_eq!(json["buildCommand"]["name"], "echo");
}

#[yare::parameterized(
    preparing  = { JobState::Preparing },
    building   = { JobState::Building },
    completing = { JobState::Completing },
    completed  = { JobState::Completed },
)]
fn job_state_parses_its_display(state: JobState) {
    assert_eq!(state.to_string().parse::<JobState>(), Ok(state));
}

#[test]
fn build_result_from_passed() {
    assert_eq!(BuildResult::from_passed(true), BuildResult::Passed);
    assert_eq!(BuildResult::from_passed(false), BuildResult::Failed);
    assert!(!BuildResult::Cancelled.is_passed());
}
