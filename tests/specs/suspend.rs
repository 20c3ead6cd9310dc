// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pause, cancel, and resume-across-processes specs.

use crate::prelude::*;
use std::sync::atomic::Ordering;
use tempfile::tempdir;

#[tokio::test]
async fn pause_during_planning_then_resume_on_a_fresh_instance() {
    let runs = tempdir().unwrap();
    let control = WorkflowControl::new();
    let control_in_stage = control.clone();
    let pausing_plan = ScriptedStage::ok(canonical_update(State::Planning))
        .with_hook(move || control_in_stage.pause());
    let (coordinator, _) = coordinator_with(vec![(State::Planning, pausing_plan)]);
    let mut first = orchestrator(
        coordinator,
        runs.path(),
        RunOptions::default().control(control),
    );

    let report = first.run(sample_input()).await;

    assert_eq!(report.status, RunStatus::Paused);
    assert_eq!(report.final_state, State::Paused);
    assert!(report.data.plan.is_some());
    assert!(report.data.analysis.is_some());
    assert!(report.data.search_results.is_some());

    let record = load_record(runs.path());
    assert_eq!(record.current_state, State::Paused);
    assert!(record.context.contains_key("plan"));

    // a completely fresh orchestrator against the same store
    let (coordinator, counters) = coordinator_with(vec![]);
    let mut second = orchestrator(coordinator, runs.path(), RunOptions::default());
    let report = second.resume().await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.final_state, State::Done);
    // earlier stages are not re-run after the resume
    assert_eq!(counters[&State::Analyzing].load(Ordering::SeqCst), 0);
    assert_eq!(counters[&State::Searching].load(Ordering::SeqCst), 0);
    assert_eq!(counters[&State::Planning].load(Ordering::SeqCst), 0);
    assert_eq!(counters[&State::Generating].load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancel_persists_partial_data() {
    let runs = tempdir().unwrap();
    let control = WorkflowControl::new();
    let control_in_stage = control.clone();
    let cancelling_analyze = ScriptedStage::ok(canonical_update(State::Analyzing))
        .with_hook(move || control_in_stage.cancel());
    let (coordinator, counters) = coordinator_with(vec![(State::Analyzing, cancelling_analyze)]);
    let mut orchestrator = orchestrator(
        coordinator,
        runs.path(),
        RunOptions::default().control(control),
    );

    let report = orchestrator.run(sample_input()).await;

    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(report.final_state, State::Cancelled);
    assert!(report.data.analysis.is_some());
    assert_eq!(counters[&State::Searching].load(Ordering::SeqCst), 0);

    let record = load_record(runs.path());
    assert_eq!(record.current_state, State::Cancelled);
    assert!(record.context.contains_key("analysis"));
    // terminal: control states never enter history
    assert!(record.history.iter().all(|s| !matches!(s, State::Cancelled | State::Paused | State::Error)));
}

#[tokio::test]
async fn paused_record_survives_the_round_trip_unchanged() {
    let runs = tempdir().unwrap();
    let control = WorkflowControl::new();
    let control_in_stage = control.clone();
    let pausing_search = ScriptedStage::ok(canonical_update(State::Searching))
        .with_hook(move || control_in_stage.pause());
    let (coordinator, _) = coordinator_with(vec![(State::Searching, pausing_search)]);
    let mut orchestrator = orchestrator(
        coordinator,
        runs.path(),
        RunOptions::default().control(control),
    );
    orchestrator.run(sample_input()).await;

    // write the loaded record back and make sure nothing shifts
    let store = JsonStateStore::for_run(runs.path(), &RunId::from(RUN_ID));
    let before = load_record(runs.path());
    store.save(&before).unwrap();
    let after = load_record(runs.path());

    assert_eq!(before, after);
    assert_eq!(before.history.last(), Some(&State::Planning));
}
