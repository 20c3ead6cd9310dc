// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical guard set: prerequisites for forward progress.

use crate::machine::Guard;
use mend_core::State;
use serde_json::Value;
use std::collections::HashMap;

/// Guards installed by default on every machine.
///
/// - Entry to `SEARCHING` requires an analysis in context.
/// - Entry to `PLANNING` requires a non-empty list of search results.
pub fn default_guards() -> HashMap<State, Guard> {
    let mut guards: HashMap<State, Guard> = HashMap::new();
    guards.insert(
        State::Searching,
        Box::new(|context| context.get("analysis").is_some_and(|v| !v.is_null())),
    );
    guards.insert(
        State::Planning,
        Box::new(|context| {
            context
                .get("search_results")
                .and_then(Value::as_array)
                .is_some_and(|hits| !hits.is_empty())
        }),
    );
    guards
}

#[cfg(test)]
#[path = "guards_tests.rs"]
mod tests;
