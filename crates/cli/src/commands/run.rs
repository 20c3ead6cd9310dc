// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mend run`: start a new run against an issue.

use crate::config::MendConfig;
use crate::output;
use clap::Args;
use mend_core::{RunId, RunInput};
use mend_engine::{Orchestrator, RunOptions, SubmitMode, WorkflowControl};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Repository owner (user or organization)
    #[arg(long)]
    pub owner: String,

    /// Repository name
    #[arg(long)]
    pub repo: String,

    /// Issue number to fix
    #[arg(long)]
    pub issue: u64,

    /// Preview only; never open a change request
    #[arg(long)]
    pub dry_run: bool,

    /// Override the configured retry budget
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Reuse a specific run id (continues its record)
    #[arg(long)]
    pub run_id: Option<String>,
}

pub async fn execute(config: &MendConfig, args: RunArgs, verbose: bool) -> anyhow::Result<i32> {
    let submit_mode = if args.dry_run || !config.auto_pr {
        SubmitMode::DryRun
    } else {
        SubmitMode::Submit
    };
    let coordinator = super::build_coordinator(config, submit_mode)?;

    let control = WorkflowControl::new();
    let options = RunOptions::default()
        .max_attempts(args.max_attempts.unwrap_or(config.max_attempts))
        .verbose_errors(verbose)
        .control(control.clone());
    let mut orchestrator = Orchestrator::with_options(
        coordinator,
        &config.runs_root,
        args.run_id.map(RunId::from),
        options,
    );
    super::install_interrupt_handler(control);

    tracing::info!(
        run_id = %orchestrator.run_id(),
        owner = %args.owner,
        repo = %args.repo,
        issue = args.issue,
        "starting run"
    );
    let report = orchestrator.run(RunInput::new(args.owner, args.repo, args.issue)).await;
    output::print_report(&report);
    Ok(output::exit_code(&report))
}
