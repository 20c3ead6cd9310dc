// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mend: drive a code-host issue through the fix pipeline.

mod commands;
mod config;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mend", version, about = "Autonomous issue-fixing agent")]
struct Cli {
    /// Config file path (default: ./mend.toml, then ~/.config/mend/mend.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Include error details in output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new run against an issue
    Run(commands::run::RunArgs),
    /// Continue a suspended run
    Resume {
        run_id: String,
    },
    /// Show the current state of a run
    Status {
        run_id: String,
    },
    /// Show the states a run has visited
    History {
        run_id: String,
    },
}

async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config = config::MendConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Run(args) => commands::run::execute(&config, args, cli.verbose).await,
        Commands::Resume { run_id } => {
            commands::resume::execute(&config, &run_id, cli.verbose).await
        }
        Commands::Status { run_id } => commands::status::execute(&config, &run_id),
        Commands::History { run_id } => commands::history::execute(&config, &run_id),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("MEND_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            1
        }
    };
    std::process::exit(code);
}
