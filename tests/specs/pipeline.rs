// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forward-path specs: the happy path and what it leaves on disk.

use crate::prelude::*;
use std::sync::atomic::Ordering;
use tempfile::tempdir;

#[tokio::test]
async fn happy_path_completes_with_a_submission() {
    let runs = tempdir().unwrap();
    let (coordinator, counters) = coordinator_with(vec![]);
    let mut orchestrator = orchestrator(coordinator, runs.path(), RunOptions::default());

    let report = orchestrator.run(sample_input()).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.final_state, State::Done);
    assert_eq!(report.attempt, 1);

    let submission = report.data.submission.as_ref().unwrap();
    assert_eq!(submission.pr_number, 101);
    assert!(submission.pr_url.ends_with("/pull/101"));

    for (state, counter) in &counters {
        assert_eq!(counter.load(Ordering::SeqCst), 1, "{state} should run exactly once");
    }
}

#[tokio::test]
async fn happy_path_persists_the_full_state_sequence() {
    let runs = tempdir().unwrap();
    let (coordinator, _) = coordinator_with(vec![]);
    let mut orchestrator = orchestrator(coordinator, runs.path(), RunOptions::default());

    orchestrator.run(sample_input()).await;

    let record = load_record(runs.path());
    assert_eq!(record.current_state, State::Done);
    assert_eq!(record.attempt, 1);
    assert_eq!(
        record.history,
        vec![
            State::Idle,
            State::Analyzing,
            State::Searching,
            State::Planning,
            State::Generating,
            State::Applying,
            State::Building,
            State::Testing,
            State::Reviewing,
            State::Submitting,
        ]
    );
    // the record lands at the conventional path
    assert!(runs.path().join(RUN_ID).join("state.json").is_file());
}

#[tokio::test]
async fn workflow_data_accumulates_monotonically() {
    let runs = tempdir().unwrap();
    let (coordinator, _) = coordinator_with(vec![]);
    let mut orchestrator = orchestrator(coordinator, runs.path(), RunOptions::default());

    let report = orchestrator.run(sample_input()).await;

    let data = &report.data;
    assert!(data.issue.is_some());
    assert!(data.analysis.is_some());
    assert!(data.search_results.is_some());
    assert!(data.plan.is_some());
    assert!(data.proposal.is_some());
    assert!(data.applied.is_some());
    assert!(data.build.is_some());
    assert!(data.tests.is_some());
    assert!(data.review.is_some());
    assert!(data.submission.is_some());
}

#[tokio::test]
async fn rerunning_a_completed_run_is_a_no_op() {
    let runs = tempdir().unwrap();
    let (coordinator, _) = coordinator_with(vec![]);
    let mut orchestrator = orchestrator(coordinator, runs.path(), RunOptions::default());
    orchestrator.run(sample_input()).await;

    // same run id, fresh orchestrator: the loop sees DONE and exits
    let (coordinator, counters) = coordinator_with(vec![]);
    let mut again = crate::prelude::orchestrator(coordinator, runs.path(), RunOptions::default());
    let report = again.run(sample_input()).await;

    assert_eq!(report.status, RunStatus::Completed);
    for counter in counters.values() {
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
