// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build reporting from the agent back to the dispatcher.

use gantry_core::{BuildId, BuildResult, Envelope, JobState, StatusReport};
use gantry_wire::TransportSender;
use tracing::{debug, warn};

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeReporter, ReportCall};

/// Sink for everything a running build produces.
///
/// Calls are made from the single interpreter run, so their order is the
/// order the dispatcher should see.
pub trait Reporter: Send + Sync {
    /// One chunk of console output.
    fn console(&self, text: &str);

    /// A progress state change.
    fn status(&self, state: JobState);

    /// The terminal result.
    fn completed(&self, result: BuildResult);
}

/// Reports over the agent transport.
///
/// Console text is sent one line per envelope, newline terminated.
///
/// Without a build id (a bare `cmd`) console text is still forwarded but
/// status changes have nothing to attach to and are dropped.
pub struct TransportReporter {
    sender: TransportSender,
    build_id: Option<BuildId>,
}

impl TransportReporter {
    pub fn new(sender: TransportSender, build_id: Option<BuildId>) -> Self {
        Self { sender, build_id }
    }

    fn send(&self, envelope: Result<Envelope, serde_json::Error>) {
        let envelope = match envelope {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "failed to encode report");
                return;
            }
        };
        let action = envelope.action;
        if let Err(e) = self.sender.send(envelope) {
            warn!(%action, error = %e, "dropping report");
        }
    }

    fn report(&self, job_state: JobState, result: Option<BuildResult>) {
        let Some(build_id) = &self.build_id else {
            debug!(%job_state, "no build id, status not reported");
            return;
        };
        self.send(Envelope::status(&StatusReport {
            build_id: build_id.clone(),
            job_state,
            result,
        }));
    }
}

impl Reporter for TransportReporter {
    fn console(&self, text: &str) {
        let mut line = text.to_string();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        self.send(Envelope::console(self.build_id.as_ref(), &line));
    }

    fn status(&self, state: JobState) {
        self.report(state, None);
    }

    fn completed(&self, result: BuildResult) {
        self.report(JobState::Completed, Some(result));
    }
}

#[cfg(test)]
#[path = "reporter_tests.rs"]
mod tests;
