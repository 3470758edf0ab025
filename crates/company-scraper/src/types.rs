// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core value types shared by the dispatcher, the retry task and the collector.

use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One unit of work: the URL of a page to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Terminal result of one target's task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// A record was produced on attempt `attempts - 1`.
    Succeeded { attempts: u32 },
    /// Every attempt failed; `error` is the last one seen.
    Failed { attempts: u32, error: ScrapeError },
}

/// What travels through the error sink: a terminal failure and whose it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub target: Target,
    pub attempts: u32,
    pub error: ScrapeError,
}

/// Lifecycle of a single task.
///
/// `Pending → Attempting(0) → … → Succeeded | Failed`. A failed attempt
/// moves to `Attempting(k + 1)` while budget remains, otherwise to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Attempting(u32),
    Succeeded,
    Failed,
}

impl TaskState {
    /// Enter the first attempt. Any other state is returned unchanged.
    pub fn start(self) -> Self {
        match self {
            TaskState::Pending => TaskState::Attempting(0),
            other => other,
        }
    }

    /// Advance after the current attempt returned.
    pub fn on_attempt_result(self, succeeded: bool, max_retries: u32) -> Self {
        match self {
            TaskState::Attempting(_) if succeeded => TaskState::Succeeded,
            TaskState::Attempting(k) if k < max_retries => TaskState::Attempting(k + 1),
            TaskState::Attempting(_) => TaskState::Failed,
            other => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}
