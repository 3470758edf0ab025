// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! `company-scraper run`: scrape every target once, with retries.

use crate::batch::Batch;
use crate::config::{load_targets_file, ScrapeConfig};
use crate::fetch::BrowserFetcher;
use crate::output::StdoutSink;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{NoopRenderer, Renderer};
use crate::sites::Site;
use crate::types::Target;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Site profile to scrape
    #[arg(long, value_enum, default_value_t = Site::Glassdoor)]
    pub site: Site,
    /// Page to scrape instead of the site's defaults. Can be repeated.
    #[arg(long = "target")]
    pub targets: Vec<String>,
    /// File with one target URL per line (`#` starts a comment)
    #[arg(long)]
    pub targets_file: Option<PathBuf>,
    /// Retries after the first attempt for each target
    #[arg(long, default_value_t = crate::config::DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
    /// Deadline for each attempt, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
    /// Seed for user-agent selection
    #[arg(long)]
    pub seed: Option<u64>,
    /// Path to a Chromium/Chrome binary
    #[arg(long)]
    pub chromium: Option<PathBuf>,
}

impl RunArgs {
    /// Build a validated config. Explicit targets replace the site defaults.
    pub fn into_config(self) -> Result<ScrapeConfig> {
        let mut config = ScrapeConfig::for_site(self.site);

        let mut targets: Vec<Target> = self.targets.into_iter().map(Target::new).collect();
        if let Some(path) = &self.targets_file {
            targets.extend(load_targets_file(path)?);
        }
        if !targets.is_empty() {
            config.targets = targets;
        }

        config.max_retries = self.max_retries;
        config.attempt_timeout = Duration::from_secs(self.timeout);
        config.seed = self.seed;
        config.chromium_path = self.chromium;
        config.validate()?;
        Ok(config)
    }
}

/// Run the batch. Target failures are logged, never returned as errors.
pub async fn run(args: RunArgs) -> Result<()> {
    let config = args.into_config()?;

    let renderer: Arc<dyn Renderer> = match ChromiumRenderer::new(config.chromium_path.as_deref()) {
        Ok(renderer) => {
            info!(path = %renderer.chrome_path().display(), "using Chromium");
            Arc::new(renderer)
        }
        Err(e) => {
            warn!("{e:#}");
            warn!("every target will fail to start a browser session");
            Arc::new(NoopRenderer)
        }
    };

    let fetcher = BrowserFetcher::new(renderer, config.site.profile(), Arc::new(StdoutSink));
    let failures = Batch::from_config(&config, Arc::new(fetcher)).run().await;

    info!(
        site = %config.site,
        targets = config.targets.len(),
        failed = failures.len(),
        "batch complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse(argv: &[&str]) -> RunArgs {
        let mut full = vec!["company-scraper"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args
    }

    #[test]
    fn test_defaults_match_glassdoor_profile() {
        let config = parse(&[]).into_config().unwrap();
        assert_eq!(config.site, Site::Glassdoor);
        assert_eq!(config.targets.len(), 10);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.attempt_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_explicit_targets_replace_defaults() {
        let config = parse(&[
            "--site",
            "linkedin",
            "--target",
            "https://www.linkedin.com/company/example/",
            "--max-retries",
            "1",
            "--timeout",
            "3",
        ])
        .into_config()
        .unwrap();
        assert_eq!(config.site, Site::Linkedin);
        assert_eq!(
            config.targets,
            vec![Target::from("https://www.linkedin.com/company/example/")]
        );
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.attempt_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        assert!(parse(&["--target", "example.com"]).into_config().is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert!(parse(&["--timeout", "0"]).into_config().is_err());
    }
}
