// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_record_starts_idle_at_attempt_one() {
    let record = RunRecord::new(RunId::from("run-abc"), "2026-08-01T10:00:00.000Z");
    assert_eq!(record.current_state, State::Idle);
    assert_eq!(record.attempt, 1);
    assert!(record.history.is_empty());
    assert!(record.error.is_none());
}

#[test]
fn serializes_with_camel_case_keys() {
    let record = RunRecord::new(RunId::from("run-abc"), "2026-08-01T10:00:00.000Z");
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["runId"], "run-abc");
    assert_eq!(json["currentState"], "IDLE");
    assert_eq!(json["updatedAt"], "2026-08-01T10:00:00.000Z");
    assert_eq!(json["attempt"], 1);
}

#[test]
fn round_trip_preserves_unknown_fields() {
    let json = serde_json::json!({
        "runId": "run-abc",
        "currentState": "BUILDING",
        "updatedAt": "2026-08-01T10:00:00.000Z",
        "attempt": 2,
        "context": {"owner": "acme"},
        "history": ["IDLE", "ANALYZING"],
        "annotations": {"triage": "p1"},
    });

    let record: RunRecord = serde_json::from_value(json).unwrap();
    assert_eq!(record.current_state, State::Building);
    assert_eq!(record.extra["annotations"]["triage"], "p1");

    let back = serde_json::to_value(&record).unwrap();
    assert_eq!(back["annotations"]["triage"], "p1");
}

#[test]
fn error_info_round_trips() {
    let mut record = RunRecord::new(RunId::from("run-abc"), "2026-08-01T10:00:00.000Z");
    record.error =
        Some(ErrorInfo::new("RETRYABLE_ERROR", "tests failed").with_details("assertion at foo.rs"));

    let json = serde_json::to_string(&record).unwrap();
    let back: RunRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back.error, record.error);
}

#[test]
fn absent_error_is_omitted_from_json() {
    let record = RunRecord::new(RunId::from("run-abc"), "2026-08-01T10:00:00.000Z");
    let json = serde_json::to_string(&record).unwrap();
    assert!(!json.contains("\"error\""));
}

#[test]
fn history_preserves_order() {
    let mut record = RunRecord::new(RunId::from("run-abc"), "2026-08-01T10:00:00.000Z");
    record.history = vec![State::Idle, State::Analyzing, State::Searching];

    let back: RunRecord =
        serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
    assert_eq!(back.history, vec![State::Idle, State::Analyzing, State::Searching]);
}
