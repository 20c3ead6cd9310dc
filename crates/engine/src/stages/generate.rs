// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GENERATING`: ask the model for the concrete patch set.
//!
//! This is the stage every fix-cycle retry rewinds to, so its output must
//! fully replace any earlier proposal.

use super::parse_stage_json;
use crate::coordinator::{StageError, StageHandler};
use async_trait::async_trait;
use mend_adapters::{GenerateOptions, LlmClient};
use mend_core::{FixProposal, WorkflowData, WorkflowUpdate};
use std::sync::Arc;

const GENERATOR_SYSTEM: &str = "You are a software engineer producing a fix. Respond with a \
single JSON object: {\"explanation\": string, \"patches\": [{\"path\": string, \"diff\": \
string}]}. Each diff is a unified diff against the named file.";

pub struct GenerateStage {
    llm: Arc<dyn LlmClient>,
}

impl GenerateStage {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl StageHandler for GenerateStage {
    async fn execute(&self, data: &WorkflowData) -> Result<WorkflowUpdate, StageError> {
        let plan = data
            .plan
            .as_ref()
            .ok_or_else(|| StageError::new("missing required fix plan before generation"))?;

        let mut prompt = String::from("Produce unified-diff patches implementing this plan.\n\n");
        for (i, step) in plan.steps.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, step));
        }
        if !plan.target_files.is_empty() {
            prompt.push_str(&format!("\nTarget files: {}\n", plan.target_files.join(", ")));
        }
        if let Some(analysis) = &data.analysis {
            prompt.push_str(&format!("\nContext: {}\n", analysis.summary));
        }
        if let Some(prior) = &data.proposal {
            // Retry pass: the previous proposal failed somewhere downstream.
            prompt.push_str(&format!(
                "\nA previous proposal was rejected; do not repeat it:\n{}\n",
                prior.explanation
            ));
        }

        let options = GenerateOptions::default().with_system(GENERATOR_SYSTEM);
        let completion = self.llm.generate(&prompt, &options).await?;
        let proposal: FixProposal = parse_stage_json(&completion.content, "fix proposal")?;
        if proposal.patches.is_empty() {
            return Err(StageError::new("fix proposal contains no patches"));
        }

        let mut costs = data.costs.unwrap_or_default();
        costs.add_usage(&completion.usage);

        Ok(WorkflowUpdate { proposal: Some(proposal), costs: Some(costs), ..Default::default() })
    }
}
