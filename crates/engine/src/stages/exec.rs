// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `BUILDING` and `TESTING`: run the configured commands in the workspace.

use super::log_tail;
use crate::coordinator::{StageError, StageHandler};
use async_trait::async_trait;
use mend_adapters::{ExecOutcome, Sandbox};
use mend_core::{BuildOutcome, TestOutcome, WorkflowData, WorkflowUpdate};
use std::sync::Arc;
use std::time::Duration;

const LOG_TAIL_CHARS: usize = 4000;

async fn run_command(
    sandbox: &Arc<dyn Sandbox>,
    command: &str,
    timeout: Duration,
    what: &str,
) -> Result<(ExecOutcome, String), StageError> {
    let outcome = sandbox.exec(command, timeout).await?;
    let tail = log_tail(&outcome.combined(), LOG_TAIL_CHARS);
    if outcome.timed_out {
        return Err(StageError::new(format!(
            "{what} command timed out after {}s",
            timeout.as_secs()
        ))
        .with_details(tail));
    }
    if !outcome.success() {
        return Err(StageError::new(format!(
            "{what} failed with exit code {}",
            outcome.exit_code
        ))
        .with_details(tail));
    }
    Ok((outcome, tail))
}

pub struct BuildStage {
    sandbox: Arc<dyn Sandbox>,
    command: String,
    timeout: Duration,
}

impl BuildStage {
    pub fn new(sandbox: Arc<dyn Sandbox>, command: String, timeout: Duration) -> Self {
        Self { sandbox, command, timeout }
    }
}

#[async_trait]
impl StageHandler for BuildStage {
    async fn execute(&self, _data: &WorkflowData) -> Result<WorkflowUpdate, StageError> {
        let (_, tail) = run_command(&self.sandbox, &self.command, self.timeout, "build").await?;
        Ok(WorkflowUpdate {
            build: Some(BuildOutcome { success: true, log_tail: tail }),
            ..Default::default()
        })
    }
}

pub struct TestStage {
    sandbox: Arc<dyn Sandbox>,
    command: String,
    timeout: Duration,
}

impl TestStage {
    pub fn new(sandbox: Arc<dyn Sandbox>, command: String, timeout: Duration) -> Self {
        Self { sandbox, command, timeout }
    }
}

#[async_trait]
impl StageHandler for TestStage {
    async fn execute(&self, _data: &WorkflowData) -> Result<WorkflowUpdate, StageError> {
        let (_, tail) = run_command(&self.sandbox, &self.command, self.timeout, "tests").await?;
        Ok(WorkflowUpdate {
            tests: Some(TestOutcome { success: true, log_tail: tail }),
            ..Default::default()
        })
    }
}
