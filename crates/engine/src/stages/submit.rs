// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SUBMITTING`: open the change request, or record a dry-run preview.

use super::SubmitMode;
use crate::coordinator::{StageError, StageHandler};
use async_trait::async_trait;
use mend_adapters::{ChangeRequest, HostClient};
use mend_core::{WorkflowData, WorkflowUpdate};
use std::sync::Arc;

pub struct SubmitStage {
    host: Arc<dyn HostClient>,
    mode: SubmitMode,
    base_branch: String,
}

impl SubmitStage {
    pub fn new(host: Arc<dyn HostClient>, mode: SubmitMode, base_branch: String) -> Self {
        Self { host, mode, base_branch }
    }
}

#[async_trait]
impl StageHandler for SubmitStage {
    async fn execute(&self, data: &WorkflowData) -> Result<WorkflowUpdate, StageError> {
        let proposal = data
            .proposal
            .as_ref()
            .ok_or_else(|| StageError::new("missing required fix proposal before submit"))?;

        if self.mode == SubmitMode::DryRun {
            tracing::info!(
                issue = data.issue_number,
                patches = proposal.patches.len(),
                "dry run, not opening a change request"
            );
            return Ok(WorkflowUpdate::default());
        }

        let title = match &data.issue {
            Some(issue) => format!("Fix #{}: {}", issue.number, issue.title),
            None => format!("Fix #{}", data.issue_number),
        };
        let body = format!("{}\n\nCloses #{}", proposal.explanation, data.issue_number);
        let request = ChangeRequest {
            title,
            body,
            head: format!("mend/issue-{}", data.issue_number),
            base: self.base_branch.clone(),
        };

        let submission =
            self.host.create_change_request(&data.owner, &data.repo, &request).await?;
        tracing::info!(pr = submission.pr_number, url = %submission.pr_url, "change request opened");

        Ok(WorkflowUpdate { submission: Some(submission), ..Default::default() })
    }
}
