// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry and failure specs: the fix cycle rewinds, budgets bind, fatal
//! failures stop immediately.

use crate::prelude::*;
use std::sync::atomic::Ordering;
use tempfile::tempdir;

#[tokio::test]
async fn generation_failure_retries_and_completes() {
    let runs = tempdir().unwrap();
    let (coordinator, counters) = coordinator_with(vec![(
        State::Generating,
        ScriptedStage::fail_then_ok("malformed JSON", canonical_update(State::Generating)),
    )]);
    let mut orchestrator =
        orchestrator(coordinator, runs.path(), RunOptions::default().max_attempts(3));

    let report = orchestrator.run(sample_input()).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.final_state, State::Done);
    assert_eq!(report.attempt, 2);
    assert_eq!(counters[&State::Generating].load(Ordering::SeqCst), 2);
    for state in [
        State::Analyzing,
        State::Searching,
        State::Planning,
        State::Applying,
        State::Building,
        State::Testing,
        State::Reviewing,
        State::Submitting,
    ] {
        assert_eq!(counters[&state].load(Ordering::SeqCst), 1, "{state}");
    }
}

#[tokio::test]
async fn test_failure_regenerates_the_fix() {
    let runs = tempdir().unwrap();
    let (coordinator, counters) = coordinator_with(vec![(
        State::Testing,
        ScriptedStage::fail_then_ok("2 tests failed", canonical_update(State::Testing)),
    )]);
    let mut orchestrator =
        orchestrator(coordinator, runs.path(), RunOptions::default().max_attempts(5));

    let report = orchestrator.run(sample_input()).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.attempt, 2);
    for state in [State::Generating, State::Applying, State::Building, State::Testing] {
        assert_eq!(counters[&state].load(Ordering::SeqCst), 2, "{state} reruns");
    }
    assert_eq!(counters[&State::Reviewing].load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exhausted_retries_leave_an_error_record() {
    let runs = tempdir().unwrap();
    let (coordinator, _) =
        coordinator_with(vec![(State::Testing, ScriptedStage::failing("tests failed"))]);
    let mut orchestrator =
        orchestrator(coordinator, runs.path(), RunOptions::default().max_attempts(2));

    let report = orchestrator.run(sample_input()).await;

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.final_state, State::Error);
    assert_eq!(report.attempt, 2);
    assert_eq!(report.error.as_ref().unwrap().code, "RETRYABLE_ERROR");

    let record = load_record(runs.path());
    assert_eq!(record.current_state, State::Error);
    assert_eq!(record.attempt, 2);
    assert_eq!(record.error.unwrap().code, "RETRYABLE_ERROR");
}

#[tokio::test]
async fn fatal_authentication_failure_stops_at_attempt_one() {
    let runs = tempdir().unwrap();
    let (coordinator, _) = coordinator_with(vec![(
        State::Analyzing,
        ScriptedStage::failing("Authentication failed"),
    )]);
    let mut orchestrator =
        orchestrator(coordinator, runs.path(), RunOptions::default().max_attempts(3));

    let report = orchestrator.run(sample_input()).await;

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.final_state, State::Error);
    assert_eq!(report.attempt, 1);
    assert_eq!(report.error.as_ref().unwrap().code, "FATAL_ERROR");
}

#[tokio::test]
async fn resume_retries_a_recorded_retryable_failure() {
    let runs = tempdir().unwrap();
    let (coordinator, _) =
        coordinator_with(vec![(State::Building, ScriptedStage::failing("link error"))]);
    let mut first =
        orchestrator(coordinator, runs.path(), RunOptions::default().max_attempts(1));
    let report = first.run(sample_input()).await;
    assert_eq!(report.status, RunStatus::Failed);

    // a later process with budget picks the run back up from the record
    let (coordinator, counters) = coordinator_with(vec![]);
    let mut second =
        orchestrator(coordinator, runs.path(), RunOptions::default().max_attempts(2));
    let report = second.resume().await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.attempt, 2);
    assert_eq!(counters[&State::Analyzing].load(Ordering::SeqCst), 0);
    assert_eq!(counters[&State::Generating].load(Ordering::SeqCst), 1);
}
