// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording reporter for tests
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;

use gantry_core::{BuildResult, JobState};
use parking_lot::Mutex;

use super::Reporter;

/// Recorded reporter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportCall {
    Console(String),
    Status(JobState),
    Completed(BuildResult),
}

/// Reporter that records every call in order
#[derive(Clone, Default)]
pub struct FakeReporter {
    calls: Arc<Mutex<Vec<ReportCall>>>,
}

impl FakeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ReportCall> {
        self.calls.lock().clone()
    }

    pub fn console_lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                ReportCall::Console(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn result(&self) -> Option<BuildResult> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            ReportCall::Completed(result) => Some(*result),
            _ => None,
        })
    }
}

impl Reporter for FakeReporter {
    fn console(&self, text: &str) {
        self.calls.lock().push(ReportCall::Console(text.to_string()));
    }

    fn status(&self, state: JobState) {
        self.calls.lock().push(ReportCall::Status(state));
    }

    fn completed(&self, result: BuildResult) {
        self.calls.lock().push(ReportCall::Completed(result));
    }
}
