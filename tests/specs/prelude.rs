// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the scenario specs.

pub use mend_core::{RunId, RunInput, State};
pub use mend_engine::testing::{canonical_update, coordinator_with, sample_input, ScriptedStage};
pub use mend_engine::{
    Coordinator, Orchestrator, RunOptions, RunReport, RunStatus, WorkflowControl,
};
pub use mend_storage::{JsonStateStore, StateStore};

use mend_storage::JsonStateStore as Store;
use std::path::Path;

pub const RUN_ID: &str = "run-spec";

/// Orchestrator over a real JSON store rooted in `runs_root`.
pub fn orchestrator(
    coordinator: Coordinator,
    runs_root: &Path,
    options: RunOptions,
) -> Orchestrator<Store, mend_core::SystemClock> {
    Orchestrator::with_options(
        coordinator,
        runs_root,
        Some(RunId::from(RUN_ID)),
        options,
    )
}

/// The record persisted for the spec run.
pub fn load_record(runs_root: &Path) -> mend_core::RunRecord {
    JsonStateStore::for_run(runs_root, &RunId::from(RUN_ID))
        .load()
        .expect("record should load")
        .expect("record should exist")
}
