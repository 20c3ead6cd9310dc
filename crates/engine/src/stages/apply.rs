// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `APPLYING`: write the proposal's patches into the workspace.

use crate::coordinator::{StageError, StageHandler};
use async_trait::async_trait;
use mend_adapters::{patch, Sandbox};
use mend_core::{ApplyOutcome, WorkflowData, WorkflowUpdate};
use std::sync::Arc;

pub struct ApplyStage {
    sandbox: Arc<dyn Sandbox>,
}

impl ApplyStage {
    pub fn new(sandbox: Arc<dyn Sandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl StageHandler for ApplyStage {
    async fn execute(&self, data: &WorkflowData) -> Result<WorkflowUpdate, StageError> {
        let proposal = data
            .proposal
            .as_ref()
            .ok_or_else(|| StageError::new("missing required fix proposal before apply"))?;
        if proposal.patches.is_empty() {
            return Err(StageError::new("fix proposal contains no patches"));
        }

        let mut applied_files = Vec::with_capacity(proposal.patches.len());
        for file_patch in &proposal.patches {
            let parsed = patch::parse_unified(&file_patch.diff).map_err(|e| {
                StageError::new(format!("patch for {} is invalid: {e}", file_patch.path))
                    .with_details(file_patch.diff.clone())
            })?;
            // A missing file is an insert target, not an error.
            let current = self.sandbox.read_file(&file_patch.path)?.unwrap_or_default();
            let updated = patch::apply(&current, &parsed).map_err(|e| {
                StageError::new(format!("patch for {} does not apply: {e}", file_patch.path))
                    .with_details(file_patch.diff.clone())
            })?;
            self.sandbox.write_file(&file_patch.path, &updated)?;
            applied_files.push(file_patch.path.clone());
        }

        tracing::info!(files = applied_files.len(), "patches applied");
        Ok(WorkflowUpdate {
            applied: Some(ApplyOutcome { applied_files }),
            ..Default::default()
        })
    }
}
