//! Routing work to agents that may not be there.

use crate::prelude::*;
use gantry_core::{AgentId, CommandNode, Envelope};

#[tokio::test]
async fn routing_to_unknown_agent_is_dropped() {
    let dispatcher = Dispatcher::start().await;

    let ghost = AgentId::new("ghost");
    dispatcher.server.send(&ghost, Envelope::cancel_build());
    dispatcher
        .server
        .send_build(&ghost, "b1", CommandNode::echo("nobody"))
        .unwrap();

    // The coordinating task is still serving requests.
    assert!(dispatcher.server.agents().await.unwrap().is_empty());
    assert!(dispatcher.recorder.changes().is_empty());

    let agent = dispatcher.agent("a1").await;
    dispatcher
        .server
        .send_build(&agent.id, "b2", CommandNode::echo("somebody"))
        .unwrap();
    dispatcher
        .wait_states(BUILD, "b2", &["Building", "Passed"])
        .await;
}

#[tokio::test]
async fn builds_reach_only_their_agent() {
    let dispatcher = Dispatcher::start().await;
    let a1 = dispatcher.agent("a1").await;
    let _a2 = dispatcher.agent("a2").await;

    dispatcher
        .server
        .send_build(&a1.id, "b1", CommandNode::echo("for a1"))
        .unwrap();

    dispatcher
        .wait_states(AGENT, "a1", &["Idle", "Building", "Idle"])
        .await;
    assert_eq!(dispatcher.states(AGENT, "a2"), vec!["Idle"]);
}

#[tokio::test]
async fn disconnected_agent_leaves_the_registry() {
    let dispatcher = Dispatcher::start().await;
    let agent = dispatcher.agent("a1").await;
    assert_eq!(
        dispatcher.server.agents().await.unwrap(),
        vec![AgentId::new("a1")]
    );

    agent.task.abort();

    dispatcher
        .wait_states(AGENT, "a1", &["Idle", "LostContact"])
        .await;
    assert!(dispatcher.server.agents().await.unwrap().is_empty());
}
