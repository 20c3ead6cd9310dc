// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mend status`: inspect a run record.

use crate::config::MendConfig;
use crate::output;
use anyhow::Context as _;
use mend_core::RunId;
use mend_storage::{JsonStateStore, StateStore};

pub fn execute(config: &MendConfig, run_id: &str) -> anyhow::Result<i32> {
    let run_id = RunId::from(run_id);
    let store = JsonStateStore::for_run(&config.runs_root, &run_id);
    let record = store
        .load()
        .context("reading run record")?
        .with_context(|| format!("no run record found for {run_id}"))?;

    output::print_status(&record);
    Ok(0)
}
