// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Units of work dispatched to agents.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::command::CommandNode;

crate::define_id! {
    /// Identifier of one unit of work.
    ///
    /// Every server-side path for the build (console log, artifacts,
    /// properties) is derived from it, so distinct ids never share paths.
    pub struct BuildId;
}

/// Route prefix for console logs.
pub const CONSOLE_LOG_PATH: &str = "/console";
/// Route prefix for artifacts.
pub const ARTIFACTS_PATH: &str = "/artifacts";
/// Route prefix for build properties.
pub const PROPERTIES_PATH: &str = "/properties";

impl BuildId {
    /// `/builds/<id>`
    pub fn locator(&self) -> String {
        format!("/builds/{}", self.0)
    }

    pub fn console_url(&self) -> String {
        format!("{}{}", CONSOLE_LOG_PATH, self.locator())
    }

    pub fn artifacts_url(&self) -> String {
        format!("{}{}", ARTIFACTS_PATH, self.locator())
    }

    pub fn properties_url(&self) -> String {
        format!("{}{}", PROPERTIES_PATH, self.locator())
    }

    /// Url for a single artifact file of this build.
    pub fn artifact_url(&self, file: &str) -> String {
        format!("{}?file={}", self.artifacts_url(), file)
    }

    /// Recover a build id from the last segment of a console/artifact path.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or(path);
        path.rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map(BuildId::new)
    }
}

/// A command tree together with the references it reports against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub build_id: BuildId,
    pub build_locator: String,
    pub build_locator_for_display: String,
    #[serde(rename = "consoleURI")]
    pub console_url: String,
    pub artifact_upload_base_url: String,
    pub property_base_url: String,
    pub build_command: CommandNode,
}

impl Build {
    pub fn new(build_id: impl Into<BuildId>, command: CommandNode) -> Self {
        let build_id = build_id.into();
        let locator = build_id.locator();
        Self {
            build_locator_for_display: locator.clone(),
            build_locator: locator,
            console_url: build_id.console_url(),
            artifact_upload_base_url: build_id.artifacts_url(),
            property_base_url: build_id.properties_url(),
            build_id,
            build_command: command,
        }
    }
}

/// Progress of a build as reported by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    Preparing,
    Building,
    Completing,
    Completed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Preparing => "Preparing",
            JobState::Building => "Building",
            JobState::Completing => "Completing",
            JobState::Completed => "Completed",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Preparing" => Ok(JobState::Preparing),
            "Building" => Ok(JobState::Building),
            "Completing" => Ok(JobState::Completing),
            "Completed" => Ok(JobState::Completed),
            other => Err(format!("unknown job state: {other}")),
        }
    }
}

/// Overall outcome of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildResult {
    Passed,
    Failed,
    Cancelled,
}

impl BuildResult {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            BuildResult::Passed
        } else {
            BuildResult::Failed
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, BuildResult::Passed)
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildResult::Passed => "Passed",
            BuildResult::Failed => "Failed",
            BuildResult::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
