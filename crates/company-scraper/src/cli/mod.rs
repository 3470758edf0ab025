// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the company-scraper binary.

pub mod doctor;
pub mod run_cmd;
pub mod sites_cmd;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Logs go to stderr; `RUST_LOG`
/// overrides the default level.
pub fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose {
        "company_scraper=debug"
    } else {
        "company_scraper=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
