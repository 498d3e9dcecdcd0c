//! Dispatching a build to a connected agent.

use crate::prelude::*;
use gantry_core::{BuildId, BuildResult, CommandNode, RunIf};

#[tokio::test]
async fn echo_then_fail_reports_console_and_failure() {
    let dispatcher = Dispatcher::start().await;
    let agent = dispatcher.agent("a1").await;

    let tree = CommandNode::compose([
        CommandNode::echo("hi").with_run_if(RunIf::Any),
        CommandNode::fail("").with_run_if(RunIf::Any),
    ]);
    dispatcher.server.send_build(&agent.id, "b1", tree).unwrap();

    dispatcher
        .wait_states(AGENT, "a1", &["Idle", "Building", "Idle"])
        .await;
    dispatcher
        .wait_states(BUILD, "b1", &["Building", "Failed"])
        .await;

    let build = BuildId::new("b1");
    similar_asserts::assert_eq!(dispatcher.server.console_log(&build).await.unwrap(), "hi\n");
    assert_eq!(
        dispatcher.server.build_result(&build).await.unwrap(),
        Some(BuildResult::Failed)
    );
}

#[tokio::test]
async fn passing_build_persists_passed() {
    let dispatcher = Dispatcher::start().await;
    let agent = dispatcher.agent("a1").await;

    let tree = CommandNode::compose([
        CommandNode::echo("compile"),
        CommandNode::report_status(gantry_core::JobState::Completing),
        CommandNode::echo("done"),
    ]);
    dispatcher.server.send_build(&agent.id, "b2", tree).unwrap();

    dispatcher
        .wait_states(BUILD, "b2", &["Building", "Completing", "Passed"])
        .await;
    similar_asserts::assert_eq!(
        dispatcher.server.console_log(&BuildId::new("b2")).await.unwrap(),
        "compile\ndone\n"
    );
}

#[tokio::test]
async fn builds_run_one_at_a_time_in_order() {
    let dispatcher = Dispatcher::start().await;
    let agent = dispatcher.agent("a1").await;

    dispatcher
        .server
        .send_build(&agent.id, "first", CommandNode::echo("one"))
        .unwrap();
    dispatcher
        .server
        .send_build(&agent.id, "second", CommandNode::echo("two"))
        .unwrap();

    dispatcher
        .wait_states(
            AGENT,
            "a1",
            &["Idle", "Building", "Idle", "Building", "Idle"],
        )
        .await;
    let builds: Vec<String> = dispatcher
        .recorder
        .changes()
        .into_iter()
        .filter(|c| c.class == BUILD && c.state == "Passed")
        .map(|c| c.id)
        .collect();
    assert_eq!(builds, vec!["first", "second"]);
}
