// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn base_data() -> WorkflowData {
    WorkflowData::new(RunInput::new("acme", "widget", 7))
}

fn sample_analysis() -> IssueAnalysis {
    IssueAnalysis {
        summary: "off-by-one in pager".to_string(),
        category: "bug".to_string(),
        keywords: vec!["pager".to_string(), "offset".to_string()],
        suspect_files: vec!["src/pager.rs".to_string()],
    }
}

#[test]
fn new_carries_input_fields() {
    let data = base_data();
    assert_eq!(data.owner, "acme");
    assert_eq!(data.repo, "widget");
    assert_eq!(data.issue_number, 7);
    assert!(data.issue.is_none());
    assert!(data.costs.is_none());
}

#[test]
fn merge_populates_only_set_fields() {
    let mut data = base_data();
    data.merge(WorkflowUpdate { analysis: Some(sample_analysis()), ..Default::default() });

    assert!(data.analysis.is_some());
    assert!(data.plan.is_none());
}

#[test]
fn merge_overwrites_previous_value() {
    let mut data = base_data();
    data.merge(WorkflowUpdate { analysis: Some(sample_analysis()), ..Default::default() });

    let mut second = sample_analysis();
    second.summary = "regenerated".to_string();
    data.merge(WorkflowUpdate { analysis: Some(second), ..Default::default() });

    assert_eq!(data.analysis.unwrap().summary, "regenerated");
}

#[test]
fn merge_never_clears_fields() {
    let mut data = base_data();
    data.merge(WorkflowUpdate { analysis: Some(sample_analysis()), ..Default::default() });
    data.merge(WorkflowUpdate::default());

    assert!(data.analysis.is_some());
}

#[test]
fn empty_update_is_empty() {
    assert!(WorkflowUpdate::default().is_empty());
    let update = WorkflowUpdate { analysis: Some(sample_analysis()), ..Default::default() };
    assert!(!update.is_empty());
}

#[test]
fn context_omits_absent_fields() {
    let data = base_data();
    let context = data.to_context();

    assert!(context.contains_key("owner"));
    assert!(!context.contains_key("analysis"));
    assert!(!context.contains_key("search_results"));
}

#[test]
fn context_round_trip() {
    let mut data = base_data();
    data.merge(WorkflowUpdate {
        analysis: Some(sample_analysis()),
        search_results: Some(vec![SearchHit {
            path: "src/pager.rs".to_string(),
            line: 42,
            excerpt: "let end = offset + len;".to_string(),
            pattern: "offset".to_string(),
        }]),
        ..Default::default()
    });

    let restored = WorkflowData::from_context(&data.to_context()).unwrap();
    assert_eq!(restored, data);
}

#[test]
fn from_context_tolerates_extra_keys() {
    let mut context = base_data().to_context();
    context.insert("annotated_by".to_string(), serde_json::json!("external-tool"));

    let restored = WorkflowData::from_context(&context).unwrap();
    assert_eq!(restored.owner, "acme");
}

#[test]
fn cost_metrics_accumulate() {
    let mut costs = CostMetrics::default();
    costs.add_usage(&TokenUsage { prompt_tokens: 100, completion_tokens: 20, total_tokens: 120 });
    costs.add_usage(&TokenUsage { prompt_tokens: 50, completion_tokens: 10, total_tokens: 60 });

    assert_eq!(costs.llm_calls, 2);
    assert_eq!(costs.total_tokens, 180);
}
