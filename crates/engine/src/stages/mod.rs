// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The nine pipeline stage handlers, wired over the adapter traits.
//!
//! Each handler is a small struct holding its collaborators; the registry is
//! assembled once per run by [`default_coordinator`]. Submit behavior is
//! fixed at construction (preview and submit builds are separate
//! registries), so no runtime flag is shared with handlers.

mod analyze;
mod apply;
mod exec;
mod generate;
mod plan;
mod review;
mod search;
mod submit;

pub use analyze::AnalyzeStage;
pub use apply::ApplyStage;
pub use exec::{BuildStage, TestStage};
pub use generate::GenerateStage;
pub use plan::PlanStage;
pub use review::ReviewStage;
pub use search::SearchStage;
pub use submit::SubmitStage;

use crate::coordinator::{Coordinator, StageError};
use mend_adapters::{
    CodeSearch, HostClient, HostError, LlmClient, LlmError, Sandbox, SandboxError, SearchError,
};
use mend_core::State;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

impl From<HostError> for StageError {
    fn from(e: HostError) -> Self {
        StageError::new(e.to_string())
    }
}

impl From<LlmError> for StageError {
    fn from(e: LlmError) -> Self {
        StageError::new(e.to_string())
    }
}

impl From<SearchError> for StageError {
    fn from(e: SearchError) -> Self {
        StageError::new(e.to_string())
    }
}

impl From<SandboxError> for StageError {
    fn from(e: SandboxError) -> Self {
        StageError::new(e.to_string())
    }
}

/// Strip a Markdown code fence if the model wrapped its JSON in one.
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Decode a stage's structured model output.
fn parse_stage_json<T: DeserializeOwned>(content: &str, what: &str) -> Result<T, StageError> {
    serde_json::from_str(extract_json(content)).map_err(|e| {
        StageError::new(format!("malformed JSON in {what}: {e}"))
            .with_details(content.chars().take(2000).collect::<String>())
    })
}

/// Last `max` characters of a command log.
fn log_tail(log: &str, max: usize) -> String {
    let chars: Vec<char> = log.chars().collect();
    let start = chars.len().saturating_sub(max);
    chars[start..].iter().collect()
}

/// Whether the run ends in a real change request or a local preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    DryRun,
    Submit,
}

/// Adapter bundle injected into the stage handlers.
#[derive(Clone)]
pub struct StageDeps {
    pub host: Arc<dyn HostClient>,
    pub llm: Arc<dyn LlmClient>,
    pub search: Arc<dyn CodeSearch>,
    pub sandbox: Arc<dyn Sandbox>,
}

/// Pipeline knobs that come from configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub build_command: String,
    pub test_command: String,
    pub command_timeout: Duration,
    pub base_branch: String,
    pub submit_mode: SubmitMode,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            build_command: "cargo build".to_string(),
            test_command: "cargo test".to_string(),
            command_timeout: Duration::from_secs(600),
            base_branch: "main".to_string(),
            submit_mode: SubmitMode::DryRun,
        }
    }
}

/// Build the full nine-stage registry.
pub fn default_coordinator(deps: StageDeps, settings: &PipelineSettings) -> Coordinator {
    let mut coordinator = Coordinator::new();
    coordinator.register(
        State::Analyzing,
        Box::new(AnalyzeStage::new(deps.host.clone(), deps.llm.clone())),
    );
    coordinator.register(State::Searching, Box::new(SearchStage::new(deps.search.clone())));
    coordinator.register(State::Planning, Box::new(PlanStage::new(deps.llm.clone())));
    coordinator.register(State::Generating, Box::new(GenerateStage::new(deps.llm.clone())));
    coordinator.register(State::Applying, Box::new(ApplyStage::new(deps.sandbox.clone())));
    coordinator.register(
        State::Building,
        Box::new(BuildStage::new(
            deps.sandbox.clone(),
            settings.build_command.clone(),
            settings.command_timeout,
        )),
    );
    coordinator.register(
        State::Testing,
        Box::new(TestStage::new(
            deps.sandbox.clone(),
            settings.test_command.clone(),
            settings.command_timeout,
        )),
    );
    coordinator.register(State::Reviewing, Box::new(ReviewStage::new(deps.llm.clone())));
    coordinator.register(
        State::Submitting,
        Box::new(SubmitStage::new(
            deps.host.clone(),
            settings.submit_mode,
            settings.base_branch.clone(),
        )),
    );
    coordinator
}

#[cfg(test)]
#[path = "stages_tests.rs"]
mod tests;
