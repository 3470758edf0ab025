// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use company_scraper::cli;
use company_scraper::cli::run_cmd::RunArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "company-scraper",
    about = "Scrape company overview pages with a headless browser",
    version,
    args_conflicts_with_subcommands = true,
    after_help = "Run 'company-scraper <command> --help' for details on each command.\nWith no command, runs the default batch."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every target of a site, retrying failed pages
    Run(RunArgs),
    /// List built-in site profiles
    Sites,
    /// Check that a Chromium binary can be found
    Doctor {
        /// Path to a Chromium/Chrome binary
        #[arg(long)]
        chromium: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose, cli.log_json);

    let result = match cli.command {
        None => cli::run_cmd::run(cli.run).await,
        Some(Commands::Run(args)) => cli::run_cmd::run(args).await,
        Some(Commands::Sites) => cli::sites_cmd::run(),
        Some(Commands::Doctor { chromium }) => cli::doctor::run(chromium.as_deref()),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "company-scraper", &mut std::io::stdout());
            Ok(())
        }
    };

    // 0 = batch finished (even with failed targets), 1 = could not run
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
