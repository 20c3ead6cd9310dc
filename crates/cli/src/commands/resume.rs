// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mend resume`: continue a suspended run.

use crate::config::MendConfig;
use crate::output;
use anyhow::Context as _;
use mend_core::RunId;
use mend_engine::{Orchestrator, RunOptions, SubmitMode, WorkflowControl};
use mend_storage::{JsonStateStore, StateStore};

pub async fn execute(config: &MendConfig, run_id: &str, verbose: bool) -> anyhow::Result<i32> {
    let run_id = RunId::from(run_id);
    let store = JsonStateStore::for_run(&config.runs_root, &run_id);
    store
        .load()
        .context("reading run record")?
        .with_context(|| format!("no run record found for {run_id}"))?;

    let submit_mode = if config.auto_pr { SubmitMode::Submit } else { SubmitMode::DryRun };
    let coordinator = super::build_coordinator(config, submit_mode)?;

    let control = WorkflowControl::new();
    let options = RunOptions::default()
        .max_attempts(config.max_attempts)
        .verbose_errors(verbose)
        .control(control.clone());
    let mut orchestrator =
        Orchestrator::with_options(coordinator, &config.runs_root, Some(run_id), options);
    super::install_interrupt_handler(control);

    let report = orchestrator.resume().await;
    output::print_report(&report);
    Ok(output::exit_code(&report))
}
