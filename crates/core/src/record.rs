// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable run record.
//!
//! Serialized as a single self-describing JSON document. Field names are
//! camelCase on the wire so external tooling reads naturally; unknown fields
//! are preserved across a load/save round-trip.

use crate::id::RunId;
use crate::state::State;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured error payload recorded on `FAIL` transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Persisted state of a single run. Exactly one record per run id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub run_id: RunId,
    pub current_state: State,
    /// ISO-8601 UTC timestamp of the last committed transition.
    pub updated_at: String,
    /// Count of `RETRY` traversals plus one.
    pub attempt: u32,
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Operational states previously visited, oldest first.
    #[serde(default)]
    pub history: Vec<State>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    /// Fields written by external tooling survive a round-trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunRecord {
    /// Fresh record in `IDLE` at attempt 1.
    pub fn new(run_id: RunId, updated_at: impl Into<String>) -> Self {
        Self {
            run_id,
            current_state: State::Idle,
            updated_at: updated_at.into(),
            attempt: 1,
            context: Map::new(),
            history: Vec::new(),
            error: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
