// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Code-host client: issue fetch, change-request creation, comments.

use async_trait::async_trait;
use mend_core::{IssueRecord, Submission};
use serde::Deserialize;
use std::time::Duration;

/// Errors from the code host.
///
/// Display strings are load-bearing: the recovery classifier matches on
/// them ("authentication failed", "rate limit", the status code), so keep
/// them stable.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("rate limit exceeded: {0}")]
    RateLimit(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("host error: http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// A change request to open against the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    pub title: String,
    pub body: String,
    /// Head branch carrying the fix.
    pub head: String,
    /// Base branch to merge into.
    pub base: String,
}

/// Client for the code-hosting service.
#[async_trait]
pub trait HostClient: Send + Sync {
    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<IssueRecord, HostError>;

    async fn create_change_request(
        &self,
        owner: &str,
        repo: &str,
        request: &ChangeRequest,
    ) -> Result<Submission, HostError>;

    async fn comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), HostError>;
}

/// GitHub REST v3 client.
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GithubClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.github.com";

    pub fn new(token: impl Into<String>) -> Result<Self, HostError> {
        let http = reqwest::Client::builder()
            .user_agent("mend")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HostError::Transport(e.to_string()))?;
        Ok(Self { http, base_url: Self::DEFAULT_BASE_URL.to_string(), token: token.into() })
    }

    /// Point at a different API root (test servers, GitHub Enterprise).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn transport(e: reqwest::Error) -> HostError {
        if e.is_timeout() {
            HostError::Transport("request timed out".to_string())
        } else {
            HostError::Transport(e.to_string())
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, HostError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => HostError::Auth(format!("http {}: {}", status.as_u16(), body)),
            404 => HostError::NotFound(body),
            429 => HostError::RateLimit(body),
            code => HostError::Status { status: code, body },
        })
    }
}

#[derive(Deserialize)]
struct IssueWire {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    user: Option<UserWire>,
    #[serde(default)]
    labels: Vec<LabelWire>,
}

#[derive(Deserialize)]
struct UserWire {
    login: String,
}

#[derive(Deserialize)]
struct LabelWire {
    name: String,
}

impl From<IssueWire> for IssueRecord {
    fn from(wire: IssueWire) -> Self {
        IssueRecord {
            number: wire.number,
            title: wire.title,
            body: wire.body.unwrap_or_default(),
            labels: wire.labels.into_iter().map(|l| l.name).collect(),
            url: wire.html_url,
            author: wire.user.map(|u| u.login),
        }
    }
}

#[derive(Deserialize)]
struct PullWire {
    number: u64,
    html_url: String,
}

#[async_trait]
impl HostClient for GithubClient {
    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<IssueRecord, HostError> {
        let url = format!("{}/repos/{}/{}/issues/{}", self.base_url, owner, repo, number);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(Self::transport)?;
        let wire: IssueWire = Self::check(resp).await?.json().await.map_err(Self::transport)?;
        Ok(wire.into())
    }

    async fn create_change_request(
        &self,
        owner: &str,
        repo: &str,
        request: &ChangeRequest,
    ) -> Result<Submission, HostError> {
        let url = format!("{}/repos/{}/{}/pulls", self.base_url, owner, repo);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&serde_json::json!({
                "title": request.title,
                "body": request.body,
                "head": request.head,
                "base": request.base,
            }))
            .send()
            .await
            .map_err(Self::transport)?;
        let wire: PullWire = Self::check(resp).await?.json().await.map_err(Self::transport)?;
        Ok(Submission {
            pr_number: wire.number,
            pr_url: wire.html_url,
            branch: Some(request.head.clone()),
        })
    }

    async fn comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), HostError> {
        let url =
            format!("{}/repos/{}/{}/issues/{}/comments", self.base_url, owner, repo, number);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await
            .map_err(Self::transport)?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// In-memory host for tests. Change-request numbers count up from 101.
    #[derive(Default)]
    pub struct FakeHostClient {
        issues: Mutex<HashMap<(String, String, u64), IssueRecord>>,
        errors: Mutex<VecDeque<HostError>>,
        created: Mutex<Vec<ChangeRequest>>,
        comments: Mutex<Vec<(u64, String)>>,
        next_pr: AtomicU64,
    }

    impl FakeHostClient {
        pub fn new() -> Self {
            Self { next_pr: AtomicU64::new(101), ..Self::default() }
        }

        pub fn put_issue(&self, owner: &str, repo: &str, issue: IssueRecord) {
            self.issues
                .lock()
                .insert((owner.to_string(), repo.to_string(), issue.number), issue);
        }

        /// Queue an error; the next call returns it instead of succeeding.
        pub fn push_error(&self, error: HostError) {
            self.errors.lock().push_back(error);
        }

        pub fn created_requests(&self) -> Vec<ChangeRequest> {
            self.created.lock().clone()
        }

        pub fn comments(&self) -> Vec<(u64, String)> {
            self.comments.lock().clone()
        }

        fn take_error(&self) -> Option<HostError> {
            self.errors.lock().pop_front()
        }
    }

    #[async_trait]
    impl HostClient for FakeHostClient {
        async fn get_issue(
            &self,
            owner: &str,
            repo: &str,
            number: u64,
        ) -> Result<IssueRecord, HostError> {
            if let Some(e) = self.take_error() {
                return Err(e);
            }
            self.issues
                .lock()
                .get(&(owner.to_string(), repo.to_string(), number))
                .cloned()
                .ok_or_else(|| HostError::NotFound(format!("{owner}/{repo}#{number}")))
        }

        async fn create_change_request(
            &self,
            _owner: &str,
            _repo: &str,
            request: &ChangeRequest,
        ) -> Result<Submission, HostError> {
            if let Some(e) = self.take_error() {
                return Err(e);
            }
            self.created.lock().push(request.clone());
            let number = self.next_pr.fetch_add(1, Ordering::SeqCst);
            Ok(Submission {
                pr_number: number,
                pr_url: format!("https://example.test/pull/{number}"),
                branch: Some(request.head.clone()),
            })
        }

        async fn comment(
            &self,
            _owner: &str,
            _repo: &str,
            number: u64,
            body: &str,
        ) -> Result<(), HostError> {
            if let Some(e) = self.take_error() {
                return Err(e);
            }
            self.comments.lock().push((number, body.to_string()));
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeHostClient;

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
