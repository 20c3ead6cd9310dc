// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The execution loop: drives one run through the pipeline.
//!
//! Single-threaded per run: exactly one handler executes at a time, and the
//! machine sees transitions in strict serial order. Pause and cancel are
//! cooperative, observed only between handler invocations.

use crate::coordinator::Coordinator;
use crate::machine::{MachineError, StateMachine};
use crate::recovery::{Classification, RecoveryManager};
use mend_core::{
    Clock, ErrorInfo, RunId, RunInput, State, SystemClock, Trigger, WorkflowData,
};
use mend_storage::{JsonStateStore, StateStore};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Final status of a run attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Failed,
    Cancelled,
    Paused,
    /// Loop-exit sentinel; not produced by a normal termination.
    Running,
}

mend_core::simple_display! {
    RunStatus {
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
        Paused => "paused",
        Running => "running",
    }
}

impl RunStatus {
    fn from_state(state: State) -> Self {
        match state {
            State::Done => RunStatus::Completed,
            State::Cancelled => RunStatus::Cancelled,
            State::Paused => RunStatus::Paused,
            State::Error => RunStatus::Failed,
            _ => RunStatus::Running,
        }
    }
}

/// Summary returned by [`Orchestrator::run`] and [`Orchestrator::resume`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub status: RunStatus,
    pub final_state: State,
    pub data: WorkflowData,
    pub attempt: u32,
    pub duration_ms: u64,
    pub error: Option<ErrorInfo>,
}

/// Synchronous snapshot for status queries; always a copy, never a live
/// reference.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub run_id: RunId,
    pub state: State,
    pub data: WorkflowData,
}

/// Cloneable pause/cancel signal handle.
///
/// The CLI's interrupt handler holds one of these; so can a handler that
/// wants to suspend its own run. Signals are observed at the next loop
/// boundary, never mid-handler, and repeated signals are idempotent.
#[derive(Debug, Clone, Default)]
pub struct WorkflowControl {
    pause: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
}

impl WorkflowControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.pause.store(true, Ordering::SeqCst);
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn pause_requested(&self) -> bool {
        self.pause.load(Ordering::SeqCst)
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.pause.store(false, Ordering::SeqCst);
        self.cancel.store(false, Ordering::SeqCst);
    }
}

/// Per-run options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_attempts: u32,
    /// Include error details (stack-like context) in reports.
    pub verbose_errors: bool,
    /// External control handle; one is created when not supplied.
    pub control: WorkflowControl,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { max_attempts: 3, verbose_errors: false, control: WorkflowControl::new() }
    }
}

impl RunOptions {
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose_errors = verbose;
        self
    }

    pub fn control(mut self, control: WorkflowControl) -> Self {
        self.control = control;
        self
    }
}

/// Top-level driver tying the machine, recovery manager, and coordinator
/// together.
pub struct Orchestrator<S, C> {
    coordinator: Coordinator,
    machine: StateMachine<S, C>,
    recovery: RecoveryManager,
    clock: C,
    control: WorkflowControl,
    data: WorkflowData,
    last_error: Option<Classification>,
    verbose_errors: bool,
}

impl Orchestrator<JsonStateStore, SystemClock> {
    /// Standard construction: JSON store at `<runs_root>/<run_id>/state.json`.
    pub fn new(coordinator: Coordinator, runs_root: &Path, run_id: Option<RunId>) -> Self {
        Self::with_options(coordinator, runs_root, run_id, RunOptions::default())
    }

    pub fn with_options(
        coordinator: Coordinator,
        runs_root: &Path,
        run_id: Option<RunId>,
        options: RunOptions,
    ) -> Self {
        let run_id = run_id.unwrap_or_default();
        let store = JsonStateStore::for_run(runs_root, &run_id);
        let machine = StateMachine::new(run_id, store, SystemClock);
        Self::with_machine(coordinator, machine, SystemClock, options)
    }
}

impl<S: StateStore, C: Clock> Orchestrator<S, C> {
    /// Construction over a pre-built machine (tests, custom stores).
    pub fn with_machine(
        coordinator: Coordinator,
        machine: StateMachine<S, C>,
        clock: C,
        options: RunOptions,
    ) -> Self {
        Self {
            coordinator,
            machine,
            recovery: RecoveryManager::new(options.max_attempts),
            clock,
            control: options.control,
            data: WorkflowData::default(),
            last_error: None,
            verbose_errors: options.verbose_errors,
        }
    }

    pub fn run_id(&self) -> &RunId {
        self.machine.run_id()
    }

    /// Cloneable signal handle for this run.
    pub fn control(&self) -> WorkflowControl {
        self.control.clone()
    }

    /// Request a cooperative pause at the next loop boundary.
    pub fn pause(&self) {
        self.control.pause();
    }

    /// Request a cooperative cancel at the next loop boundary.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Synchronous status query.
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            run_id: self.machine.run_id().clone(),
            state: self.machine.state(),
            data: self.data.clone(),
        }
    }

    /// Start (or restart) the run.
    pub async fn run(&mut self, input: RunInput) -> RunReport {
        let started = self.clock.now();
        self.control.reset();
        self.last_error = None;
        self.data = WorkflowData::new(input);

        if let Err(e) = self.machine.initialize() {
            return self.machine_failure_report(e.into(), started);
        }
        if self.machine.state() == State::Idle {
            if let Err(e) = self.machine.fire(Trigger::Start, Some(self.data.to_context())) {
                return self.machine_failure_report(e, started);
            }
        } else {
            // Restarting mid-pipeline: pick up what earlier stages produced.
            self.hydrate_from_context();
            self.last_error = self.machine.error().map(Classification::from_error_info);
        }
        tracing::info!(run_id = %self.machine.run_id(), state = %self.machine.state(), "run started");
        self.drive(started).await
    }

    /// Continue a suspended run from its persisted record.
    pub async fn resume(&mut self) -> RunReport {
        let started = self.clock.now();
        self.control.reset();
        self.last_error = None;

        if let Err(e) = self.machine.initialize() {
            return self.machine_failure_report(e.into(), started);
        }
        self.hydrate_from_context();
        self.last_error = self.machine.error().map(Classification::from_error_info);

        if self.machine.state() == State::Paused {
            if let Err(e) = self.machine.fire(Trigger::Resume, None) {
                return self.machine_failure_report(e, started);
            }
        }
        tracing::info!(run_id = %self.machine.run_id(), state = %self.machine.state(), "run resumed");
        self.drive(started).await
    }

    fn hydrate_from_context(&mut self) {
        if let Ok(prior) = WorkflowData::from_context(self.machine.context()) {
            self.data = prior;
        }
    }

    async fn drive(&mut self, started: Instant) -> RunReport {
        loop {
            let state = self.machine.state();
            if matches!(state, State::Done | State::Cancelled | State::Paused) {
                break;
            }

            if state == State::Error {
                match self.try_recover() {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(e) => return self.machine_failure_report(e, started),
                }
            }

            if self.control.pause_requested() {
                if let Err(e) = self.machine.fire(Trigger::Pause, Some(self.data.to_context())) {
                    return self.machine_failure_report(e, started);
                }
                break;
            }
            if self.control.cancel_requested() {
                if let Err(e) = self.machine.fire(Trigger::Cancel, Some(self.data.to_context())) {
                    return self.machine_failure_report(e, started);
                }
                break;
            }

            let stage_started = self.clock.now();
            let outcome = self.coordinator.execute(state, &self.data).await;
            match outcome {
                Ok(update) => {
                    self.data.merge(update);
                    let Some(trigger) = state.success_trigger() else {
                        // Only reachable with a handler registered on a
                        // state outside the forward path.
                        return self.machine_failure_report(
                            MachineError::InvalidTransition { from: state, trigger: Trigger::Fail },
                            started,
                        );
                    };
                    tracing::info!(
                        run_id = %self.machine.run_id(),
                        state = %state,
                        elapsed_ms = self.clock.now().duration_since(stage_started).as_millis() as u64,
                        "stage completed"
                    );
                    if let Err(e) = self.machine.fire(trigger, Some(self.data.to_context())) {
                        return self.machine_failure_report(e, started);
                    }
                }
                Err(stage_error) => {
                    let classification = self.recovery.classify(&stage_error, state);
                    tracing::warn!(
                        run_id = %self.machine.run_id(),
                        state = %state,
                        code = classification.code,
                        severity = %classification.severity,
                        error = %stage_error,
                        "stage failed"
                    );
                    let info = classification.to_error_info(true);
                    self.last_error = Some(classification);
                    if let Err(e) = self.machine.fail(info, None) {
                        return self.machine_failure_report(e, started);
                    }
                }
            }
        }
        self.report(started)
    }

    /// Attempt recovery from `ERROR`. Returns whether a retry was issued.
    fn try_recover(&mut self) -> Result<bool, MachineError> {
        let classification = match self.last_error.clone() {
            Some(c) => c,
            None => match self.machine.error() {
                Some(info) => Classification::from_error_info(info),
                None => return Ok(false),
            },
        };
        if !self.recovery.should_retry(self.machine.attempt(), &classification) {
            tracing::info!(
                run_id = %self.machine.run_id(),
                attempt = self.machine.attempt(),
                code = classification.code,
                "no retry permitted"
            );
            return Ok(false);
        }
        self.machine.fire(Trigger::Retry, None)?;
        self.last_error = None;
        tracing::info!(
            run_id = %self.machine.run_id(),
            state = %self.machine.state(),
            attempt = self.machine.attempt(),
            "retrying from checkpoint"
        );
        Ok(true)
    }

    fn report(&self, started: Instant) -> RunReport {
        let final_state = self.machine.state();
        let mut error = self.machine.error().cloned();
        if !self.verbose_errors {
            if let Some(e) = error.as_mut() {
                e.details = None;
            }
        }
        RunReport {
            run_id: self.machine.run_id().clone(),
            status: RunStatus::from_state(final_state),
            final_state,
            data: self.data.clone(),
            attempt: self.machine.attempt(),
            duration_ms: self.clock.now().duration_since(started).as_millis() as u64,
            error,
        }
    }

    fn machine_failure_report(&self, error: MachineError, started: Instant) -> RunReport {
        tracing::error!(run_id = %self.machine.run_id(), error = %error, "state machine failure");
        let info = ErrorInfo::new(error.code(), error.to_string());
        RunReport {
            run_id: self.machine.run_id().clone(),
            status: RunStatus::Failed,
            final_state: self.machine.state(),
            data: self.data.clone(),
            attempt: self.machine.attempt(),
            duration_ms: self.clock.now().duration_since(started).as_millis() as u64,
            error: Some(info),
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
