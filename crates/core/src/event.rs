// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State-change notification emitted after each committed transition.

use crate::id::RunId;
use crate::state::State;
use crate::trigger::Trigger;
use serde::Serialize;

/// Delivered synchronously to subscribers once the store save has returned.
///
/// A reader loading the store after receiving this event observes
/// `current_state == to` or newer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub run_id: RunId,
    pub from: State,
    pub to: State,
    pub trigger: Trigger,
    /// Epoch milliseconds at commit time.
    pub at_ms: u64,
}
