// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Countdown of outstanding tasks in a batch.
//!
//! Each task owns a [`CompletionGuard`]; dropping the guard is the only way
//! to count a task as done, so the count is decremented exactly once however
//! the task exits (return, panic, or abort).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug)]
struct Inner {
    outstanding: AtomicUsize,
    zero: Notify,
}

/// Shared, decrement-only countdown.
#[derive(Debug, Clone)]
pub struct CompletionTracker {
    inner: Arc<Inner>,
}

impl CompletionTracker {
    /// Tracker expecting `count` tasks. Guards are handed out with [`guard`](Self::guard).
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                outstanding: AtomicUsize::new(count),
                zero: Notify::new(),
            }),
        }
    }

    /// Guard for one of the `count` tasks. Must be called exactly `count` times.
    pub fn guard(&self) -> CompletionGuard {
        CompletionGuard {
            tracker: self.clone(),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Resolves once every task has completed. Returns immediately for an
    /// empty batch.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.zero.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn complete_one(&self) {
        let prev = self.inner.outstanding.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "completion tracker decremented below zero");
        if prev == 1 {
            self.inner.zero.notify_waiters();
        }
    }
}

/// Marks one task as complete when dropped.
#[derive(Debug)]
pub struct CompletionGuard {
    tracker: CompletionTracker,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.tracker.complete_one();
    }
}
