// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ANALYZING`: fetch the issue, then ask the model for a structured read.

use super::parse_stage_json;
use crate::coordinator::{StageError, StageHandler};
use async_trait::async_trait;
use mend_adapters::{GenerateOptions, HostClient, LlmClient};
use mend_core::{IssueAnalysis, IssueRecord, WorkflowData, WorkflowUpdate};
use std::sync::Arc;

const ANALYST_SYSTEM: &str = "You are a software maintenance analyst. Respond with a single \
JSON object: {\"summary\": string, \"category\": string, \"keywords\": [string], \
\"suspect_files\": [string]}. Keywords are short code-level search terms.";

pub struct AnalyzeStage {
    host: Arc<dyn HostClient>,
    llm: Arc<dyn LlmClient>,
}

impl AnalyzeStage {
    pub fn new(host: Arc<dyn HostClient>, llm: Arc<dyn LlmClient>) -> Self {
        Self { host, llm }
    }

    fn prompt(issue: &IssueRecord) -> String {
        format!(
            "Analyze this issue and identify what part of the codebase is at fault.\n\n\
             Issue #{number}: {title}\nLabels: {labels}\n\n{body}",
            number = issue.number,
            title = issue.title,
            labels = issue.labels.join(", "),
            body = issue.body,
        )
    }
}

#[async_trait]
impl StageHandler for AnalyzeStage {
    async fn execute(&self, data: &WorkflowData) -> Result<WorkflowUpdate, StageError> {
        let issue = self.host.get_issue(&data.owner, &data.repo, data.issue_number).await?;

        let options = GenerateOptions::default().with_system(ANALYST_SYSTEM);
        let completion = self.llm.generate(&Self::prompt(&issue), &options).await?;
        let analysis: IssueAnalysis = parse_stage_json(&completion.content, "issue analysis")?;

        let mut costs = data.costs.unwrap_or_default();
        costs.add_usage(&completion.usage);

        Ok(WorkflowUpdate {
            issue: Some(issue),
            analysis: Some(analysis),
            costs: Some(costs),
            ..Default::default()
        })
    }
}
