// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State listeners notified of agent and build transitions.

use std::sync::Arc;

use gantry_core::{AgentId, AgentStatus, BuildId};
use parking_lot::RwLock;

/// Class reported for agent transitions.
pub const AGENT: &str = "agent";
/// Class reported for build transitions.
pub const BUILD: &str = "build";

/// Collaborator observing `(class, id, state)` transitions.
///
/// Called synchronously on the connection task that observed the change;
/// implementations should return quickly or hand work off.
pub trait StateListener: Send + Sync {
    fn notify(&self, class: &str, id: &str, state: &str);
}

/// Ordered set of listeners shared by every connection.
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Arc<RwLock<Vec<Arc<dyn StateListener>>>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn StateListener>) {
        self.inner.write().push(listener);
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn notify_agent(&self, id: &AgentId, status: AgentStatus) {
        self.notify(AGENT, id.as_str(), status.as_str());
    }

    pub fn notify_build(&self, id: &BuildId, state: &str) {
        self.notify(BUILD, id.as_str(), state);
    }

    /// Notify every listener in registration order.
    pub fn notify(&self, class: &str, id: &str, state: &str) {
        tracing::debug!(class, id, state, "state change");
        // Snapshot so a listener may register another without deadlocking
        let listeners = self.inner.read().clone();
        for listener in listeners {
            listener.notify(class, id, state);
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
mod recording {
    use super::StateListener;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// One recorded notification.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct StateChange {
        pub class: String,
        pub id: String,
        pub state: String,
    }

    /// Listener that records every notification, for tests.
    #[derive(Clone, Default)]
    pub struct RecordingListener {
        changes: Arc<Mutex<Vec<StateChange>>>,
        changed: Arc<Notify>,
    }

    impl RecordingListener {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn changes(&self) -> Vec<StateChange> {
            self.changes.lock().clone()
        }

        /// States recorded for one `(class, id)`, in order.
        pub fn states(&self, class: &str, id: &str) -> Vec<String> {
            self.changes
                .lock()
                .iter()
                .filter(|c| c.class == class && c.id == id)
                .map(|c| c.state.clone())
                .collect()
        }

        /// Wait until `(class, id)` has reported `state`.
        ///
        /// Returns false if it did not happen within `timeout`.
        pub async fn wait_for(&self, class: &str, id: &str, state: &str, timeout: Duration) -> bool {
            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                let notified = self.changed.notified();
                if self.states(class, id).iter().any(|s| s == state) {
                    return true;
                }
                if tokio::time::timeout_at(deadline, notified).await.is_err() {
                    return false;
                }
            }
        }
    }

    impl StateListener for RecordingListener {
        fn notify(&self, class: &str, id: &str, state: &str) {
            self.changes.lock().push(StateChange {
                class: class.to_string(),
                id: id.to_string(),
                state: state.to_string(),
            });
            self.changed.notify_waiters();
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use recording::{RecordingListener, StateChange};

#[cfg(test)]
#[path = "listeners_tests.rs"]
mod tests;
