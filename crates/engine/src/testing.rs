// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted stage handlers and canonical payloads for tests.

use crate::coordinator::{Coordinator, StageError, StageHandler};
use async_trait::async_trait;
use mend_core::{
    ApplyOutcome, BuildOutcome, FixPlan, FixProposal, IssueAnalysis, IssueRecord, PatchFile,
    ReviewOutcome, RunInput, SearchHit, State, Submission, TestOutcome, WorkflowData,
    WorkflowUpdate,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

type Hook = Box<dyn Fn() + Send + Sync>;

/// Handler with a scripted response queue and a fallback; optionally runs a
/// hook on every call (used to signal pause/cancel from inside a stage).
pub struct ScriptedStage {
    script: Mutex<VecDeque<Result<WorkflowUpdate, StageError>>>,
    fallback: Result<WorkflowUpdate, StageError>,
    calls: Arc<AtomicU32>,
    hook: Option<Hook>,
}

impl ScriptedStage {
    pub fn ok(update: WorkflowUpdate) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(update),
            calls: Arc::new(AtomicU32::new(0)),
            hook: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(StageError::new(message)),
            calls: Arc::new(AtomicU32::new(0)),
            hook: None,
        }
    }

    pub fn failing_with_details(message: &str, details: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(StageError::new(message).with_details(details)),
            calls: Arc::new(AtomicU32::new(0)),
            hook: None,
        }
    }

    /// Fail once with `message`, then keep succeeding with `update`.
    pub fn fail_then_ok(message: &str, update: WorkflowUpdate) -> Self {
        let stage = Self::ok(update);
        stage.script.lock().push_back(Err(StageError::new(message)));
        stage
    }

    pub fn with_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn counter(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }
}

#[async_trait]
impl StageHandler for ScriptedStage {
    async fn execute(&self, _data: &WorkflowData) -> Result<WorkflowUpdate, StageError> {
        if let Some(hook) = &self.hook {
            hook();
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

/// The operational pipeline, in order.
pub const PIPELINE: &[State] = &[
    State::Analyzing,
    State::Searching,
    State::Planning,
    State::Generating,
    State::Applying,
    State::Building,
    State::Testing,
    State::Reviewing,
    State::Submitting,
];

/// The canonical success payload each stage would produce for the
/// `acme/widget#7` sample issue.
pub fn canonical_update(state: State) -> WorkflowUpdate {
    match state {
        State::Analyzing => WorkflowUpdate {
            issue: Some(IssueRecord {
                number: 7,
                title: "pager skips last row".into(),
                body: "repro".into(),
                labels: vec!["bug".into()],
                url: "https://example.test/issues/7".into(),
                author: Some("reporter".into()),
            }),
            analysis: Some(IssueAnalysis {
                summary: "off-by-one".into(),
                category: "bug".into(),
                keywords: vec!["pager".into()],
                suspect_files: vec!["src/pager.rs".into()],
            }),
            ..Default::default()
        },
        State::Searching => WorkflowUpdate {
            search_results: Some(vec![SearchHit {
                path: "src/pager.rs".into(),
                line: 42,
                excerpt: "let end = offset + len;".into(),
                pattern: "pager".into(),
            }]),
            ..Default::default()
        },
        State::Planning => WorkflowUpdate {
            plan: Some(FixPlan {
                steps: vec!["fix the bound".into()],
                target_files: vec!["src/pager.rs".into()],
                rationale: None,
            }),
            ..Default::default()
        },
        State::Generating => WorkflowUpdate {
            proposal: Some(FixProposal {
                explanation: "use an inclusive bound".into(),
                patches: vec![PatchFile {
                    path: "src/pager.rs".into(),
                    diff: "@@ -1 +1 @@\n-old\n+new\n".into(),
                }],
            }),
            ..Default::default()
        },
        State::Applying => WorkflowUpdate {
            applied: Some(ApplyOutcome { applied_files: vec!["src/pager.rs".into()] }),
            ..Default::default()
        },
        State::Building => WorkflowUpdate {
            build: Some(BuildOutcome { success: true, log_tail: String::new() }),
            ..Default::default()
        },
        State::Testing => WorkflowUpdate {
            tests: Some(TestOutcome { success: true, log_tail: String::new() }),
            ..Default::default()
        },
        State::Reviewing => WorkflowUpdate {
            review: Some(ReviewOutcome { approved: true, comments: vec![] }),
            ..Default::default()
        },
        State::Submitting => WorkflowUpdate {
            submission: Some(Submission {
                pr_number: 101,
                pr_url: "https://example.test/pull/101".into(),
                branch: Some("mend/issue-7".into()),
            }),
            ..Default::default()
        },
        _ => WorkflowUpdate::default(),
    }
}

/// All-green coordinator with per-state overrides; returns call counters.
pub fn coordinator_with(
    overrides: Vec<(State, ScriptedStage)>,
) -> (Coordinator, HashMap<State, Arc<AtomicU32>>) {
    let mut overrides: HashMap<State, ScriptedStage> = overrides.into_iter().collect();
    let mut coordinator = Coordinator::new();
    let mut counters = HashMap::new();
    for &state in PIPELINE {
        let stage = overrides
            .remove(&state)
            .unwrap_or_else(|| ScriptedStage::ok(canonical_update(state)));
        counters.insert(state, stage.counter());
        coordinator.register(state, Box::new(stage));
    }
    (coordinator, counters)
}

/// The sample input all scenarios use.
pub fn sample_input() -> RunInput {
    RunInput::new("acme", "widget", 7)
}
