// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! The retrying fetch task: one per target.
//!
//! Attempts run back to back with no delay between them. Every error kind is
//! retried the same way. Only a terminal failure is reported to the error
//! sink; success is silent.

use crate::error::ScrapeError;
use crate::fetch::{AttemptContext, Fetcher};
use crate::tracker::CompletionGuard;
use crate::types::{TaskFailure, TaskOutcome, TaskState, Target};
use crate::user_agent::{self, DEFAULT_USER_AGENTS};
use rand::Rng;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Producer side of the batch's error sink.
pub type ErrorSink = mpsc::Sender<TaskFailure>;

/// Consumer side of the batch's error sink.
pub type ErrorReceiver = mpsc::Receiver<TaskFailure>;

/// Create an error sink able to hold `capacity` failures without blocking.
pub fn error_channel(capacity: usize) -> (ErrorSink, ErrorReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Attempt budget and per-attempt deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `max_retries + 1` attempts in total.
    pub max_retries: u32,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

/// Run the bounded retry loop for one target.
///
/// Each attempt gets a new user agent from `user_agents` and its own
/// deadline. A deadline overrun counts as a failed attempt. An empty pool
/// falls back to the first built-in user agent; [`Batch`](crate::Batch)
/// never passes one.
pub async fn execute<R: Rng + ?Sized>(
    target: &Target,
    policy: RetryPolicy,
    fetcher: &dyn Fetcher,
    user_agents: &[String],
    rng: &mut R,
) -> TaskOutcome {
    let mut state = TaskState::Pending.start();
    let mut last_error = ScrapeError::TaskAborted;

    while let TaskState::Attempting(attempt) = state {
        if attempt > 0 {
            info!(
                url = %target,
                attempts_left = policy.max_retries - attempt,
                "retrying"
            );
        }

        let ctx = AttemptContext {
            attempt,
            deadline: Instant::now() + policy.attempt_timeout,
            user_agent: user_agent::pick(user_agents, rng)
                .unwrap_or(DEFAULT_USER_AGENTS[0])
                .to_string(),
        };

        let attempt_fut = fetcher.fetch_and_extract(target, &ctx);
        let result = match tokio::time::timeout_at(ctx.deadline, attempt_fut).await {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::DeadlineExceeded(policy.attempt_timeout)),
        };

        match result {
            Ok(()) => {
                debug!(url = %target, attempts = attempt + 1, "scrape succeeded");
                return TaskOutcome::Succeeded {
                    attempts: attempt + 1,
                };
            }
            Err(e) => {
                warn!(url = %target, attempt, kind = e.kind(), error = %e, "failed to scrape page");
                last_error = e;
                state = state.on_attempt_result(false, policy.max_retries);
            }
        }
    }

    debug_assert_eq!(state, TaskState::Failed);
    TaskOutcome::Failed {
        attempts: policy.max_retries + 1,
        error: last_error,
    }
}

/// Cleanup for one spawned task.
///
/// Dropping it without [`settle`](Self::settle) (panic, abort) reports
/// [`ScrapeError::TaskAborted`] for the target. The completion guard is
/// released after any report has been queued.
pub struct TaskGuard {
    target: Target,
    sink: ErrorSink,
    settled: bool,
    _completion: CompletionGuard,
}

impl TaskGuard {
    pub fn new(target: Target, sink: ErrorSink, completion: CompletionGuard) -> Self {
        Self {
            target,
            sink,
            settled: false,
            _completion: completion,
        }
    }

    /// Record the task's outcome, reporting it if it failed.
    pub fn settle(mut self, outcome: TaskOutcome) {
        self.settled = true;
        if let TaskOutcome::Failed { attempts, error } = outcome {
            self.report(attempts, error);
        }
    }

    fn report(&self, attempts: u32, error: ScrapeError) {
        let failure = TaskFailure {
            target: self.target.clone(),
            attempts,
            error,
        };
        if let Err(e) = self.sink.try_send(failure) {
            error!(url = %self.target, error = %e, "error sink rejected failure report");
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.report(0, ScrapeError::TaskAborted);
        }
    }
}
