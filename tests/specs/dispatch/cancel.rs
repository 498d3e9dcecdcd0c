//! Cancelling a running build.

use std::sync::Arc;

use crate::prelude::*;
use async_trait::async_trait;
use gantry_agent::{OpContext, OpError, Operation, Operations};
use gantry_core::{BuildId, BuildResult, CommandNode, RunIf};
use tokio::sync::Notify;

/// Echoes its line, then holds the build until released.
struct EchoAndHold {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl Operation for EchoAndHold {
    async fn run(&self, ctx: &mut OpContext<'_>) -> Result<bool, OpError> {
        ctx.reporter.console(ctx.node.arg("line").unwrap_or_default());
        self.started.notify_one();
        self.release.notified().await;
        Ok(true)
    }
}

#[tokio::test]
async fn cancel_between_leaves_runs_cleanup() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let mut ops = Operations::builtin();
    ops.register(
        "hold",
        EchoAndHold {
            started: Arc::clone(&started),
            release: Arc::clone(&release),
        },
    );

    let dispatcher = Dispatcher::start().await;
    let agent = dispatcher.agent_with("a1", ops).await;

    let tree = CommandNode::compose([
        CommandNode::new("hold")
            .with_arg("line", "hi")
            .with_run_if(RunIf::Any),
        CommandNode::fail("")
            .with_run_if(RunIf::Any)
            .with_on_cancel(CommandNode::echo("cleanup")),
    ]);
    dispatcher.server.send_build(&agent.id, "b1", tree).unwrap();

    tokio::time::timeout(std::time::Duration::from_secs(5), started.notified())
        .await
        .unwrap();
    dispatcher.server.cancel_build(&agent.id);
    dispatcher
        .wait_states(AGENT, "a1", &["Idle", "Building", "Cancelled"])
        .await;
    release.notify_one();

    dispatcher
        .wait_states(AGENT, "a1", &["Idle", "Building", "Cancelled", "Idle"])
        .await;
    dispatcher
        .wait_states(BUILD, "b1", &["Building", "Cancelled"])
        .await;

    let build = BuildId::new("b1");
    similar_asserts::assert_eq!(dispatcher.server.console_log(&build).await.unwrap(), "hi\ncleanup\n");
    assert_eq!(
        dispatcher.server.build_result(&build).await.unwrap(),
        Some(BuildResult::Cancelled)
    );
}

#[tokio::test]
async fn cancel_with_no_build_running_is_ignored() {
    let dispatcher = Dispatcher::start().await;
    let agent = dispatcher.agent("a1").await;

    dispatcher.server.cancel_build(&agent.id);
    dispatcher
        .server
        .send_build(&agent.id, "b1", CommandNode::echo("ok"))
        .unwrap();

    dispatcher
        .wait_states(BUILD, "b1", &["Building", "Passed"])
        .await;
    assert_eq!(
        dispatcher.states(AGENT, "a1"),
        vec!["Idle", "Building", "Idle"]
    );
}
