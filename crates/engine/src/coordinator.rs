// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry mapping each operational state to its stage handler.

use async_trait::async_trait;
use mend_core::{State, WorkflowData, WorkflowUpdate};
use std::collections::HashMap;

/// Failure of one stage execution.
///
/// The message is what the recovery manager classifies on; adapters convert
/// their typed errors into this via `Display`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct StageError {
    pub message: String,
    pub details: Option<String>,
}

impl StageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<String> for StageError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for StageError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// One pipeline stage.
///
/// Input is a read-only snapshot of the accumulated workflow data; output is
/// a partial update to merge. Handlers must tolerate re-execution after a
/// retry from an earlier state (overwriting their own prior output is fine).
#[async_trait]
pub trait StageHandler: Send + Sync {
    async fn execute(&self, data: &WorkflowData) -> Result<WorkflowUpdate, StageError>;
}

/// Holds the state → handler registry; no other mutable state, so it is
/// built once at run start and reused.
#[derive(Default)]
pub struct Coordinator {
    handlers: HashMap<State, Box<dyn StageHandler>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a state, replacing any previous one.
    pub fn register(&mut self, state: State, handler: Box<dyn StageHandler>) {
        self.handlers.insert(state, handler);
    }

    pub fn has(&self, state: State) -> bool {
        self.handlers.contains_key(&state)
    }

    /// Registered states in pipeline order.
    pub fn registered_states(&self) -> Vec<State> {
        const ORDER: &[State] = &[
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
            State::Done,
        ];
        ORDER.iter().copied().filter(|s| self.handlers.contains_key(s)).collect()
    }

    /// Dispatch to the handler for `state`.
    pub async fn execute(
        &self,
        state: State,
        data: &WorkflowData,
    ) -> Result<WorkflowUpdate, StageError> {
        match self.handlers.get(&state) {
            Some(handler) => handler.execute(data).await,
            None => Err(StageError::new(format!("no handler registered for state {state}"))),
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
