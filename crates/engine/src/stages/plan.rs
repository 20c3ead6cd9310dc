// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PLANNING`: ask the model for an ordered fix plan.

use super::parse_stage_json;
use crate::coordinator::{StageError, StageHandler};
use async_trait::async_trait;
use mend_adapters::{GenerateOptions, LlmClient};
use mend_core::{FixPlan, SearchHit, WorkflowData, WorkflowUpdate};
use std::fmt::Write as _;
use std::sync::Arc;

const PLANNER_SYSTEM: &str = "You are a software maintenance planner. Respond with a single \
JSON object: {\"steps\": [string], \"target_files\": [string], \"rationale\": string}.";

pub struct PlanStage {
    llm: Arc<dyn LlmClient>,
}

impl PlanStage {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn render_hits(hits: &[SearchHit]) -> String {
        let mut out = String::new();
        for hit in hits.iter().take(30) {
            let _ = writeln!(out, "{}:{}: {}", hit.path, hit.line, hit.excerpt);
        }
        out
    }
}

#[async_trait]
impl StageHandler for PlanStage {
    async fn execute(&self, data: &WorkflowData) -> Result<WorkflowUpdate, StageError> {
        let analysis = data
            .analysis
            .as_ref()
            .ok_or_else(|| StageError::new("missing required analysis before planning"))?;
        let hits = data.search_results.as_deref().unwrap_or(&[]);

        let prompt = format!(
            "Plan a fix for this issue.\n\nAnalysis: {summary}\nCategory: {category}\n\n\
             Relevant code locations:\n{hits}",
            summary = analysis.summary,
            category = analysis.category,
            hits = Self::render_hits(hits),
        );

        let options = GenerateOptions::default().with_system(PLANNER_SYSTEM);
        let completion = self.llm.generate(&prompt, &options).await?;
        let plan: FixPlan = parse_stage_json(&completion.content, "fix plan")?;

        let mut costs = data.costs.unwrap_or_default();
        costs.add_usage(&completion.usage);

        Ok(WorkflowUpdate { plan: Some(plan), costs: Some(costs), ..Default::default() })
    }
}
