// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Language-model client over an OpenAI-compatible chat completions API.

use async_trait::async_trait;
use mend_core::TokenUsage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wall-clock budget for a single completion request.
pub const LLM_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from the model endpoint. Display strings feed the recovery
/// classifier, same as [`crate::HostError`].
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("rate limit exceeded: {0}")]
    RateLimit(String),
    #[error("llm error: http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("empty completion")]
    Empty,
}

/// Options for one generation call.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub system: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { system: None, temperature: 0.2, max_tokens: 4096 }
    }
}

impl GenerateOptions {
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// One completion with its token usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// Client for text generation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<Completion, LlmError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<UsageWire>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize, Default)]
struct UsageWire {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

impl From<UsageWire> for TokenUsage {
    fn from(wire: UsageWire) -> Self {
        TokenUsage {
            prompt_tokens: wire.prompt_tokens,
            completion_tokens: wire.completion_tokens,
            total_tokens: wire.total_tokens,
        }
    }
}

/// HTTP client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpLlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpLlmClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(LLM_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn transport(e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(LLM_REQUEST_TIMEOUT)
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<Completion, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &options.system {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: prompt });

        let url = format!("{}/chat/completions", self.base_url);
        let started = std::time::Instant::now();
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": messages,
                "temperature": options.temperature,
                "max_tokens": options.max_tokens,
            }))
            .send()
            .await
            .map_err(Self::transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Auth(format!("http {}: {}", status.as_u16(), body)),
                429 => LlmError::RateLimit(body),
                code => LlmError::Status { status: code, body },
            });
        }

        let parsed: ChatResponse = resp.json().await.map_err(Self::transport)?;
        let usage: TokenUsage = parsed.usage.unwrap_or_default().into();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::Empty)?;

        tracing::debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            total_tokens = usage.total_tokens,
            "completion received"
        );
        Ok(Completion { content, usage })
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Scripted model for tests: responses are consumed in push order.
    #[derive(Default)]
    pub struct FakeLlmClient {
        script: Mutex<VecDeque<Result<Completion, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeLlmClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a successful completion with nominal usage.
        pub fn push_content(&self, content: impl Into<String>) {
            self.script.lock().push_back(Ok(Completion {
                content: content.into(),
                usage: TokenUsage { prompt_tokens: 10, completion_tokens: 5, total_tokens: 15 },
            }));
        }

        pub fn push_error(&self, error: LlmError) {
            self.script.lock().push_back(Err(error));
        }

        /// Prompts seen so far, in call order.
        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().clone()
        }
    }

    #[async_trait]
    impl LlmClient for FakeLlmClient {
        async fn generate(
            &self,
            prompt: &str,
            _options: &GenerateOptions,
        ) -> Result<Completion, LlmError> {
            self.prompts.lock().push(prompt.to_string());
            self.script.lock().pop_front().unwrap_or(Err(LlmError::Empty))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLlmClient;

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;
