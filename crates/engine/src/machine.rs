// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The run state machine: transition table, guards, history, persistence.
//!
//! Every committed transition is saved before it becomes visible: the record
//! is written first, and only a successful save mutates in-memory state and
//! notifies subscribers. A failed save leaves the machine exactly where it
//! was.

use mend_core::{Clock, ErrorInfo, RunId, RunRecord, State, StateChange, Trigger};
use mend_storage::{StateStore, StorageError};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Predicate on the merged context gating entry into a state.
pub type Guard = Box<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>;

type Subscriber = Box<dyn Fn(&StateChange) + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    #[error("no transition for trigger {trigger} from state {from}")]
    InvalidTransition { from: State, trigger: Trigger },
    #[error("guard rejected entry to {state}")]
    GuardRejected { state: State },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl MachineError {
    /// Stable code for the persisted/reported error payload.
    pub fn code(&self) -> &'static str {
        match self {
            MachineError::InvalidTransition { .. } => "InvalidTransition",
            MachineError::GuardRejected { .. } => "GuardRejected",
            MachineError::Storage(_) => "StorageError",
        }
    }
}

/// State machine for one run, bound to one store handle.
pub struct StateMachine<S, C> {
    run_id: RunId,
    store: S,
    clock: C,
    retry_target: Option<State>,
    guards: HashMap<State, Guard>,
    subscribers: Vec<Subscriber>,
    state: State,
    context: Map<String, Value>,
    history: Vec<State>,
    attempt: u32,
    error: Option<ErrorInfo>,
    extra: Map<String, Value>,
}

impl<S: StateStore, C: Clock> StateMachine<S, C> {
    /// New machine in `IDLE` with the canonical guard set and retry target.
    pub fn new(run_id: RunId, store: S, clock: C) -> Self {
        Self {
            run_id,
            store,
            clock,
            retry_target: Some(State::Generating),
            guards: crate::guards::default_guards(),
            subscribers: Vec::new(),
            state: State::Idle,
            context: Map::new(),
            history: Vec::new(),
            attempt: 1,
            error: None,
            extra: Map::new(),
        }
    }

    /// Replace the guard set (registration-time concern).
    pub fn with_guards(mut self, guards: HashMap<State, Guard>) -> Self {
        self.guards = guards;
        self
    }

    /// Add or replace the guard for one destination state.
    pub fn with_guard(
        mut self,
        state: State,
        guard: impl Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.guards.insert(state, Box::new(guard));
        self
    }

    /// Subscribe to committed transitions. Subscribers run synchronously
    /// after the store save returns; register them at construction.
    pub fn with_subscriber(
        mut self,
        subscriber: impl Fn(&StateChange) + Send + Sync + 'static,
    ) -> Self {
        self.subscribers.push(Box::new(subscriber));
        self
    }

    /// Override the canonical retry target (`None` falls back to history).
    pub fn with_retry_target(mut self, target: Option<State>) -> Self {
        self.retry_target = target;
        self
    }

    /// Load prior state from the store, if a record exists.
    pub fn initialize(&mut self) -> Result<(), StorageError> {
        if let Some(record) = self.store.load()? {
            tracing::debug!(
                run_id = %self.run_id,
                state = %record.current_state,
                attempt = record.attempt,
                "restored run record"
            );
            self.state = record.current_state;
            self.context = record.context;
            self.history = record.history;
            self.attempt = record.attempt;
            self.error = record.error;
            self.extra = record.extra;
        }
        Ok(())
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn history(&self) -> &[State] {
        &self.history
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Fire a trigger, optionally merging a context payload.
    pub fn fire(
        &mut self,
        trigger: Trigger,
        payload: Option<Map<String, Value>>,
    ) -> Result<StateChange, MachineError> {
        self.commit(trigger, payload, None)
    }

    /// Fire `FAIL`, recording the classified error on the record.
    pub fn fail(
        &mut self,
        error: ErrorInfo,
        payload: Option<Map<String, Value>>,
    ) -> Result<StateChange, MachineError> {
        self.commit(Trigger::Fail, payload, Some(error))
    }

    /// Next state the history would resume into.
    fn pop_target(&self) -> State {
        self.history.last().copied().unwrap_or(State::Idle)
    }

    fn destination(&self, trigger: Trigger) -> Result<State, MachineError> {
        use State::*;
        use Trigger::*;

        let from = self.state;
        let to = match trigger {
            Pause if !from.is_terminal() => Paused,
            Cancel if !from.is_terminal() => Cancelled,
            Fail if !from.is_terminal() => Error,
            Resume if from == Paused => self.pop_target(),
            Retry if from == Error => self.retry_target.unwrap_or_else(|| self.pop_target()),
            _ => match (from, trigger) {
                (Idle, Start) => Analyzing,
                (Analyzing, AnalysisOk) => Searching,
                (Searching, SearchOk) => Planning,
                (Planning, PlanOk) => Generating,
                (Generating, GenerationOk) => Applying,
                (Applying, ApplyOk) => Building,
                (Building, BuildOk) => Testing,
                (Testing, TestOk) => Reviewing,
                (Reviewing, ReviewOk) => Submitting,
                (Submitting, SubmitOk) => Done,
                _ => return Err(MachineError::InvalidTransition { from, trigger }),
            },
        };
        Ok(to)
    }

    fn commit(
        &mut self,
        trigger: Trigger,
        payload: Option<Map<String, Value>>,
        error: Option<ErrorInfo>,
    ) -> Result<StateChange, MachineError> {
        let from = self.state;
        let to = self.destination(trigger)?;

        // Shallow merge, last writer wins.
        let mut context = self.context.clone();
        if let Some(payload) = payload {
            for (key, value) in payload {
                context.insert(key, value);
            }
        }

        if let Some(guard) = self.guards.get(&to) {
            if !guard(&context) {
                tracing::warn!(run_id = %self.run_id, state = %to, "guard rejected transition");
                return Err(MachineError::GuardRejected { state: to });
            }
        }

        // History: leaving an operational state pushes a checkpoint; leaving
        // a control state never does (a pop must not land back in ERROR or
        // PAUSED). RESUME consumes the checkpoint it returns to; so does a
        // RETRY that fell back to history.
        let mut history = self.history.clone();
        let consumes_checkpoint = trigger == Trigger::Resume
            || (trigger == Trigger::Retry && self.retry_target.is_none());
        if consumes_checkpoint {
            history.pop();
        }
        if from.is_operational() {
            history.push(from);
        }

        let attempt = if trigger == Trigger::Retry { self.attempt + 1 } else { self.attempt };
        let error = match trigger {
            Trigger::Fail => error,
            Trigger::Retry => None,
            _ => self.error.clone(),
        };

        let record = RunRecord {
            run_id: self.run_id.clone(),
            current_state: to,
            updated_at: self.clock.iso_timestamp(),
            attempt,
            context: context.clone(),
            history: history.clone(),
            error: error.clone(),
            extra: self.extra.clone(),
        };
        self.store.save(&record)?;

        self.state = to;
        self.context = context;
        self.history = history;
        self.attempt = attempt;
        self.error = error;

        let change = StateChange {
            run_id: self.run_id.clone(),
            from,
            to,
            trigger,
            at_ms: self.clock.epoch_ms(),
        };
        tracing::debug!(
            run_id = %self.run_id,
            from = %from,
            to = %to,
            trigger = %trigger,
            attempt,
            "transition committed"
        );
        for subscriber in &self.subscribers {
            subscriber(&change);
        }
        Ok(change)
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
