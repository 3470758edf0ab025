// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Batch dispatch and failure collection.
//!
//! [`Batch::dispatch`] spawns one retrying task per target plus a watcher
//! that closes the error sink once the completion tracker reaches zero.
//! [`drain`] reads the sink until it closes. Tasks finish in any order.

use crate::config::ScrapeConfig;
use crate::fetch::Fetcher;
use crate::task::{self, error_channel, ErrorReceiver, RetryPolicy, TaskGuard};
use crate::tracker::CompletionTracker;
use crate::types::{TaskFailure, Target};
use crate::user_agent;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A one-shot set of independent targets.
pub struct Batch {
    targets: Vec<Target>,
    policy: RetryPolicy,
    fetcher: Arc<dyn Fetcher>,
    user_agents: Arc<[String]>,
    seed: Option<u64>,
}

impl Batch {
    /// An empty `user_agents` pool is replaced by the built-in default pool.
    pub fn new(
        targets: Vec<Target>,
        policy: RetryPolicy,
        fetcher: Arc<dyn Fetcher>,
        user_agents: Vec<String>,
    ) -> Self {
        let user_agents = if user_agents.is_empty() {
            warn!("empty user-agent pool, using the built-in defaults");
            user_agent::default_pool()
        } else {
            user_agents
        };
        Self {
            targets,
            policy,
            fetcher,
            user_agents: user_agents.into(),
            seed: None,
        }
    }

    pub fn from_config(config: &ScrapeConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::new(
            config.targets.clone(),
            config.retry_policy(),
            fetcher,
            config.user_agents.clone(),
        )
        .with_seed(config.seed)
    }

    /// Make user-agent selection reproducible. Task `i` uses `seed + i`.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn task_rng(&self, index: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }

    /// Spawn every task and the sink-closing watcher. Must be called from
    /// within a tokio runtime.
    ///
    /// The returned receiver yields one [`TaskFailure`] per failed target
    /// and closes once every task has finished.
    pub fn dispatch(self) -> ErrorReceiver {
        let count = self.targets.len();
        let (sink, rx) = error_channel(count);
        let tracker = CompletionTracker::new(count);

        info!(targets = count, max_retries = self.policy.max_retries, "dispatching batch");

        for (index, target) in self.targets.iter().enumerate() {
            let guard = TaskGuard::new(target.clone(), sink.clone(), tracker.guard());
            let target = target.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let pool = Arc::clone(&self.user_agents);
            let policy = self.policy;
            let mut rng = self.task_rng(index);

            tokio::spawn(async move {
                let outcome =
                    task::execute(&target, policy, fetcher.as_ref(), &pool, &mut rng).await;
                guard.settle(outcome);
            });
        }

        tokio::spawn(async move {
            tracker.wait().await;
            debug!("all tasks finished, closing error sink");
            drop(sink);
        });

        rx
    }

    /// Dispatch and wait for the whole batch, returning what [`drain`] logged.
    pub async fn run(self) -> Vec<TaskFailure> {
        drain(self.dispatch()).await
    }
}

/// Log every failure until the sink closes.
///
/// The returned list is for callers that want a summary; nothing here turns
/// failures into an error.
pub async fn drain(mut rx: ErrorReceiver) -> Vec<TaskFailure> {
    let mut failures = Vec::new();
    while let Some(failure) = rx.recv().await {
        error!(
            url = %failure.target,
            attempts = failure.attempts,
            kind = failure.error.kind(),
            error = %failure.error,
            "scraping error"
        );
        failures.push(failure);
    }
    failures
}
