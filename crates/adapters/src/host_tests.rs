// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn issue_wire_maps_to_record() {
    let wire: IssueWire = serde_json::from_value(serde_json::json!({
        "number": 7,
        "title": "pager skips last row",
        "body": "steps to reproduce...",
        "html_url": "https://example.test/acme/widget/issues/7",
        "user": {"login": "reporter"},
        "labels": [{"name": "bug"}, {"name": "p1"}],
    }))
    .unwrap();

    let record: IssueRecord = wire.into();
    assert_eq!(record.number, 7);
    assert_eq!(record.title, "pager skips last row");
    assert_eq!(record.labels, vec!["bug".to_string(), "p1".to_string()]);
    assert_eq!(record.author.as_deref(), Some("reporter"));
}

#[test]
fn issue_wire_tolerates_null_body_and_missing_user() {
    let wire: IssueWire = serde_json::from_value(serde_json::json!({
        "number": 9,
        "title": "t",
        "body": null,
    }))
    .unwrap();

    let record: IssueRecord = wire.into();
    assert_eq!(record.body, "");
    assert!(record.author.is_none());
    assert!(record.labels.is_empty());
}

#[test]
fn pull_wire_decodes() {
    let wire: PullWire = serde_json::from_value(serde_json::json!({
        "number": 101,
        "html_url": "https://example.test/acme/widget/pull/101",
        "state": "open",
    }))
    .unwrap();

    assert_eq!(wire.number, 101);
}

#[parameterized(
    auth = { HostError::Auth("http 401: bad".into()), "authentication failed" },
    rate = { HostError::RateLimit("slow down".into()), "rate limit" },
    server = { HostError::Status { status: 502, body: "upstream".into() }, "502" },
)]
fn error_display_matches_recovery_patterns(error: HostError, needle: &str) {
    assert!(error.to_string().to_lowercase().contains(needle), "{error}");
}

#[tokio::test]
async fn fake_serves_seeded_issue() {
    let host = FakeHostClient::new();
    host.put_issue(
        "acme",
        "widget",
        IssueRecord {
            number: 7,
            title: "t".into(),
            body: String::new(),
            labels: vec![],
            url: String::new(),
            author: None,
        },
    );

    let issue = host.get_issue("acme", "widget", 7).await.unwrap();
    assert_eq!(issue.number, 7);

    let err = host.get_issue("acme", "widget", 8).await.unwrap_err();
    assert!(matches!(err, HostError::NotFound(_)));
}

#[tokio::test]
async fn fake_numbers_pulls_from_101() {
    let host = FakeHostClient::new();
    let request = ChangeRequest {
        title: "fix".into(),
        body: "closes #7".into(),
        head: "mend/issue-7".into(),
        base: "main".into(),
    };

    let first = host.create_change_request("acme", "widget", &request).await.unwrap();
    let second = host.create_change_request("acme", "widget", &request).await.unwrap();

    assert_eq!(first.pr_number, 101);
    assert_eq!(second.pr_number, 102);
    assert_eq!(host.created_requests().len(), 2);
}

#[tokio::test]
async fn fake_scripted_error_fires_once() {
    let host = FakeHostClient::new();
    host.put_issue(
        "acme",
        "widget",
        IssueRecord {
            number: 7,
            title: "t".into(),
            body: String::new(),
            labels: vec![],
            url: String::new(),
            author: None,
        },
    );
    host.push_error(HostError::Auth("http 401: expired".into()));

    assert!(host.get_issue("acme", "widget", 7).await.is_err());
    assert!(host.get_issue("acme", "widget", 7).await.is_ok());
}
