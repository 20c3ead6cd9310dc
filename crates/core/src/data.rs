// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow data: the typed bundle accumulated across pipeline stages.
//!
//! Each stage handler receives a read-only snapshot of [`WorkflowData`] and
//! returns a [`WorkflowUpdate`] with zero or more fields populated. The
//! orchestrator merges updates field-by-field; within a forward pass the
//! field set only grows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Initial input for a run: which issue to fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInput {
    pub owner: String,
    pub repo: String,
    pub issue_number: u64,
}

impl RunInput {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, issue_number: u64) -> Self {
        Self { owner: owner.into(), repo: repo.into(), issue_number }
    }
}

/// Issue as fetched from the code host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Structured analysis of the issue produced by the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAnalysis {
    pub summary: String,
    /// Coarse fault category, e.g. "bug", "regression", "feature".
    #[serde(default)]
    pub category: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub suspect_files: Vec<String>,
}

/// One match from the codebase search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: String,
    pub line: u64,
    pub excerpt: String,
    /// The pattern that produced this hit.
    #[serde(default)]
    pub pattern: String,
}

/// Ordered plan for producing a fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixPlan {
    pub steps: Vec<String>,
    #[serde(default)]
    pub target_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// A unified diff against a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchFile {
    pub path: String,
    pub diff: String,
}

/// Proposed fix: explanation plus patches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixProposal {
    pub explanation: String,
    pub patches: Vec<PatchFile>,
}

/// Result of applying the proposal to the working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub applied_files: Vec<String>,
}

/// Result of the build command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutcome {
    pub success: bool,
    #[serde(default)]
    pub log_tail: String,
}

/// Result of the test command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub success: bool,
    #[serde(default)]
    pub log_tail: String,
}

/// Model review of the proposed fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub approved: bool,
    #[serde(default)]
    pub comments: Vec<String>,
}

/// Submitted change request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub pr_number: u64,
    pub pr_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Token usage reported by a single model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Accumulated model spend across the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostMetrics {
    pub llm_calls: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl CostMetrics {
    /// Fold one completion's usage into the running totals.
    pub fn add_usage(&mut self, usage: &TokenUsage) {
        self.llm_calls += 1;
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_tokens += usage.total_tokens;
    }
}

/// The typed bundle carried through the pipeline.
///
/// Optional fields are absent until their producing stage completes. Handlers
/// never see this mutably; they return a [`WorkflowUpdate`] instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowData {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub issue_number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<IssueRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<IssueAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchHit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<FixPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<FixProposal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied: Option<ApplyOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<TestOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<CostMetrics>,
}

/// Partial update returned by a stage handler.
///
/// Every field is optional; `Some` overwrites, `None` leaves the existing
/// value alone. Handlers may legally return an empty update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<IssueRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<IssueAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchHit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<FixPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<FixProposal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied: Option<ApplyOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<TestOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<CostMetrics>,
}

impl WorkflowUpdate {
    /// True when no field is populated.
    pub fn is_empty(&self) -> bool {
        self == &WorkflowUpdate::default()
    }
}

impl WorkflowData {
    pub fn new(input: RunInput) -> Self {
        Self {
            owner: input.owner,
            repo: input.repo,
            issue_number: input.issue_number,
            ..Self::default()
        }
    }

    /// Merge a partial update; each populated field overwrites.
    pub fn merge(&mut self, update: WorkflowUpdate) {
        macro_rules! take {
            ($($field:ident),+ $(,)?) => {
                $( if update.$field.is_some() { self.$field = update.$field; } )+
            };
        }
        take!(
            issue, analysis, search_results, plan, proposal, applied, build, tests, review,
            submission, costs,
        );
    }

    /// Serialize to the open key/value context map persisted in the record.
    ///
    /// Absent optional fields are omitted, so guards can treat key presence
    /// as "stage completed".
    pub fn to_context(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Rebuild from a persisted context map.
    pub fn from_context(context: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(context.clone()))
    }
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
