// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Company scraper library: concurrent headless-browser capture of company
//! overview pages with a bounded per-target retry budget.
//!
//! A [`batch::Batch`] spawns one retrying task per target. Failures that
//! survive every attempt are sent to a shared error sink, which
//! [`batch::drain`] reads until the last task has finished.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod fetch;
pub mod output;
pub mod renderer;
pub mod sites;
pub mod task;
pub mod tracker;
pub mod types;
pub mod user_agent;

pub use batch::{drain, Batch};
pub use config::ScrapeConfig;
pub use error::ScrapeError;
pub use fetch::{AttemptContext, BrowserFetcher, Fetcher};
pub use sites::Site;
pub use types::{TaskFailure, TaskOutcome, Target};
