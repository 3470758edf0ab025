// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Batch configuration: which site, which pages, and the retry budget.

use crate::sites::Site;
use crate::task::RetryPolicy;
use crate::types::Target;
use crate::user_agent;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable inputs of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub site: Site,
    pub targets: Vec<Target>,
    pub max_retries: u32,
    pub attempt_timeout: Duration,
    pub user_agents: Vec<String>,
    /// Seed for user-agent selection. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub chromium_path: Option<PathBuf>,
}

impl ScrapeConfig {
    /// Defaults for `site`: its built-in targets, 3 retries, 10 s per attempt.
    pub fn for_site(site: Site) -> Self {
        Self {
            site,
            targets: site.default_targets(),
            max_retries: DEFAULT_MAX_RETRIES,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            user_agents: user_agent::default_pool(),
            seed: None,
            chromium_path: None,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            attempt_timeout: self.attempt_timeout,
        }
    }

    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.user_agents.is_empty() {
            bail!("user-agent pool is empty");
        }
        if self.attempt_timeout.is_zero() {
            bail!("attempt timeout must be greater than zero");
        }
        for target in &self.targets {
            validate_target(target)?;
        }
        Ok(())
    }
}

/// A target must be an absolute http(s) URL.
pub fn validate_target(target: &Target) -> Result<()> {
    let url = url::Url::parse(target.as_str())
        .with_context(|| format!("invalid target URL: {target}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("unsupported scheme {other:?} in target {target}"),
    }
}

/// Parse a targets file: one URL per line, blank lines and `#` comments ignored.
pub fn parse_targets(text: &str) -> Vec<Target> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Target::new)
        .collect()
}

pub fn load_targets_file(path: &Path) -> Result<Vec<Target>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read targets file {}", path.display()))?;
    Ok(parse_targets(&text))
}
