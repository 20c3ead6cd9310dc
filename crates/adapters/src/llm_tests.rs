// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn chat_response_decodes_content_and_usage() {
    let resp: ChatResponse = serde_json::from_value(serde_json::json!({
        "id": "cmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"ok\":true}"}}],
        "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150},
    }))
    .unwrap();

    assert_eq!(resp.choices[0].message.content, "{\"ok\":true}");
    let usage: TokenUsage = resp.usage.unwrap().into();
    assert_eq!(usage.total_tokens, 150);
}

#[test]
fn chat_response_tolerates_missing_usage() {
    let resp: ChatResponse = serde_json::from_value(serde_json::json!({
        "choices": [{"message": {"content": "hi"}}],
    }))
    .unwrap();

    assert!(resp.usage.is_none());
}

#[test]
fn error_display_matches_recovery_patterns() {
    assert!(LlmError::Auth("http 401: nope".into())
        .to_string()
        .contains("authentication failed"));
    assert!(LlmError::RateLimit("burst".into()).to_string().contains("rate limit"));
    assert!(LlmError::Timeout(LLM_REQUEST_TIMEOUT).to_string().contains("timed out"));
}

#[tokio::test]
async fn fake_replays_script_in_order() {
    let llm = FakeLlmClient::new();
    llm.push_content("first");
    llm.push_error(LlmError::RateLimit("slow down".into()));
    llm.push_content("second");

    let options = GenerateOptions::default();
    assert_eq!(llm.generate("p1", &options).await.unwrap().content, "first");
    assert!(llm.generate("p2", &options).await.is_err());
    assert_eq!(llm.generate("p3", &options).await.unwrap().content, "second");

    assert_eq!(llm.prompts(), vec!["p1".to_string(), "p2".to_string(), "p3".to_string()]);
}

#[tokio::test]
async fn fake_exhausted_script_returns_empty() {
    let llm = FakeLlmClient::new();
    let err = llm.generate("p", &GenerateOptions::default()).await.unwrap_err();
    assert!(matches!(err, LlmError::Empty));
}
