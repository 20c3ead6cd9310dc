// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `REVIEWING`: the model judges the proposal against the issue.
//!
//! A rejected review is a stage failure so the fix cycle rewinds and
//! regenerates; the review text rides along in the error details.

use super::parse_stage_json;
use crate::coordinator::{StageError, StageHandler};
use async_trait::async_trait;
use mend_adapters::{GenerateOptions, LlmClient};
use mend_core::{ReviewOutcome, WorkflowData, WorkflowUpdate};
use std::sync::Arc;

const REVIEWER_SYSTEM: &str = "You are a strict code reviewer. Respond with a single JSON \
object: {\"approved\": bool, \"comments\": [string]}.";

pub struct ReviewStage {
    llm: Arc<dyn LlmClient>,
}

impl ReviewStage {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl StageHandler for ReviewStage {
    async fn execute(&self, data: &WorkflowData) -> Result<WorkflowUpdate, StageError> {
        let proposal = data
            .proposal
            .as_ref()
            .ok_or_else(|| StageError::new("missing required fix proposal before review"))?;

        let mut prompt = String::from("Review this proposed fix.\n\n");
        if let Some(issue) = &data.issue {
            prompt.push_str(&format!("Issue #{}: {}\n\n", issue.number, issue.title));
        }
        prompt.push_str(&format!("Explanation: {}\n\n", proposal.explanation));
        for patch in &proposal.patches {
            prompt.push_str(&format!("--- patch for {} ---\n{}\n", patch.path, patch.diff));
        }

        let options = GenerateOptions::default().with_system(REVIEWER_SYSTEM);
        let completion = self.llm.generate(&prompt, &options).await?;
        let review: ReviewOutcome = parse_stage_json(&completion.content, "review")?;

        if !review.approved {
            return Err(StageError::new("review rejected the proposed fix")
                .with_details(review.comments.join("; ")));
        }

        let mut costs = data.costs.unwrap_or_default();
        costs.add_usage(&completion.usage);

        Ok(WorkflowUpdate { review: Some(review), costs: Some(costs), ..Default::default() })
    }
}
