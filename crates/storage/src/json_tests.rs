// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::StateStore;
use mend_core::{ErrorInfo, RunId, State};
use tempfile::tempdir;

fn record(id: &str) -> RunRecord {
    RunRecord::new(RunId::from(id), "2026-08-01T10:00:00.000Z")
}

#[test]
fn load_absent_returns_none() {
    let dir = tempdir().unwrap();
    let store = JsonStateStore::new(dir.path().join("state.json"));

    assert!(!store.exists());
    assert!(store.load().unwrap().is_none());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let store = JsonStateStore::new(dir.path().join("state.json"));

    let mut rec = record("run-1");
    rec.current_state = State::Building;
    rec.attempt = 2;
    rec.history = vec![State::Idle, State::Analyzing];
    rec.error = Some(ErrorInfo::new("RETRYABLE_ERROR", "boom"));
    store.save(&rec).unwrap();

    assert!(store.exists());
    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded, rec);
}

#[test]
fn save_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let store = JsonStateStore::for_run(dir.path(), &RunId::from("run-nested"));

    store.save(&record("run-nested")).unwrap();

    assert!(dir.path().join("run-nested/state.json").is_file());
}

#[test]
fn save_overwrites_previous_record() {
    let dir = tempdir().unwrap();
    let store = JsonStateStore::new(dir.path().join("state.json"));

    store.save(&record("run-1")).unwrap();
    let mut updated = record("run-1");
    updated.current_state = State::Done;
    store.save(&updated).unwrap();

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.current_state, State::Done);
}

#[test]
fn save_leaves_no_temp_file_behind() {
    let dir = tempdir().unwrap();
    let store = JsonStateStore::new(dir.path().join("state.json"));

    store.save(&record("run-1")).unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["state.json".to_string()]);
}

#[test]
fn malformed_record_is_treated_as_absent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, b"{not json").unwrap();
    let store = JsonStateStore::new(&path);

    assert!(store.load().unwrap().is_none());
    // exists() reports the file, load() reports the absence of a usable record
    assert!(store.exists());
}

#[test]
fn unknown_fields_survive_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(
        &path,
        serde_json::json!({
            "runId": "run-1",
            "currentState": "PLANNING",
            "updatedAt": "2026-08-01T10:00:00.000Z",
            "attempt": 1,
            "pruneAfter": "2026-09-01",
        })
        .to_string(),
    )
    .unwrap();
    let store = JsonStateStore::new(&path);

    let loaded = store.load().unwrap().unwrap();
    store.save(&loaded).unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["pruneAfter"], "2026-09-01");
}
