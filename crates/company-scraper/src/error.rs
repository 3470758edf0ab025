// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for a single scrape attempt.
//!
//! Every variant is treated the same way by the retry loop: the attempt is
//! counted against the budget and retried. Nothing here is classified as
//! permanent.

use std::time::Duration;

/// Failure of one fetch-and-extract attempt, or of a whole task.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("element {selector} did not appear within the deadline")]
    ElementTimeout { selector: String },

    #[error("in-page action failed: {0}")]
    Action(String),

    #[error("expected exactly one match for {selector}, found {found}")]
    ExtractionCardinality { selector: String, found: usize },

    #[error("record serialization failed: {0}")]
    Serialization(String),

    #[error("browser session could not be started: {0}")]
    Browser(String),

    #[error("attempt exceeded its deadline of {}s", .0.as_secs_f64())]
    DeadlineExceeded(Duration),

    #[error("task ended without an outcome")]
    TaskAborted,
}

impl ScrapeError {
    /// Short machine-readable name of the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Navigation { .. } => "navigation",
            ScrapeError::ElementTimeout { .. } => "element_timeout",
            ScrapeError::Action(_) => "action",
            ScrapeError::ExtractionCardinality { .. } => "extraction_cardinality",
            ScrapeError::Serialization(_) => "serialization",
            ScrapeError::Browser(_) => "browser",
            ScrapeError::DeadlineExceeded(_) => "deadline_exceeded",
            ScrapeError::TaskAborted => "task_aborted",
        }
    }

    pub(crate) fn navigation(url: &str, err: impl std::fmt::Display) -> Self {
        ScrapeError::Navigation {
            url: url.to_string(),
            reason: format!("{err:#}"),
        }
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(e: serde_json::Error) -> Self {
        ScrapeError::Serialization(e.to_string())
    }
}
