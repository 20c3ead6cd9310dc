// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandboxed file access and command execution for the fix workspace.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("path escapes workspace root: {0}")]
    PathEscape(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ExecOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Combined output, stdout first.
    pub fn combined(&self) -> String {
        let mut s = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !s.is_empty() {
                s.push('\n');
            }
            s.push_str(&self.stderr);
        }
        s
    }
}

/// Executor for untrusted workspace operations: file upload/download plus
/// command execution with an explicit deadline.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Write file content under the workspace root (relative path).
    fn write_file(&self, path: &str, content: &str) -> Result<(), SandboxError>;

    /// Read file content; `None` when the file does not exist.
    fn read_file(&self, path: &str) -> Result<Option<String>, SandboxError>;

    /// Run a shell command in the workspace root. A deadline overrun is
    /// reported in the outcome, not as an error.
    async fn exec(&self, command: &str, timeout: Duration) -> Result<ExecOutcome, SandboxError>;
}

/// Sandbox rooted at a local directory.
pub struct LocalSandbox {
    root: PathBuf,
}

impl LocalSandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, rel: &str) -> Result<PathBuf, SandboxError> {
        let path = Path::new(rel);
        let escapes = path.is_absolute()
            || path.components().any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes {
            return Err(SandboxError::PathEscape(rel.to_string()));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl Sandbox for LocalSandbox {
    fn write_file(&self, path: &str, content: &str) -> Result<(), SandboxError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, content)?;
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<Option<String>, SandboxError> {
        let full = self.resolve(path)?;
        match std::fs::read_to_string(full) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn exec(&self, command: &str, timeout: Duration) -> Result<ExecOutcome, SandboxError> {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg(command).current_dir(&self.root).kill_on_drop(true);

        let started = std::time::Instant::now();
        match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(output) => {
                let output = output?;
                let outcome = ExecOutcome {
                    exit_code: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    timed_out: false,
                };
                tracing::debug!(
                    command,
                    exit_code = outcome.exit_code,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "command finished"
                );
                Ok(outcome)
            }
            Err(_) => {
                tracing::warn!(command, timeout_ms = timeout.as_millis() as u64, "command timed out");
                Ok(ExecOutcome {
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: format!("timed out after {}ms", timeout.as_millis()),
                    timed_out: true,
                })
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};

    /// In-memory sandbox with scripted command outcomes.
    #[derive(Default)]
    pub struct FakeSandbox {
        files: Mutex<HashMap<String, String>>,
        outcomes: Mutex<VecDeque<ExecOutcome>>,
        commands: Mutex<Vec<String>>,
    }

    impl FakeSandbox {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn put_file(&self, path: &str, content: &str) {
            self.files.lock().insert(path.to_string(), content.to_string());
        }

        pub fn file(&self, path: &str) -> Option<String> {
            self.files.lock().get(path).cloned()
        }

        /// Queue an outcome; unscripted commands succeed with empty output.
        pub fn push_outcome(&self, outcome: ExecOutcome) {
            self.outcomes.lock().push_back(outcome);
        }

        pub fn push_failure(&self, stderr: &str) {
            self.push_outcome(ExecOutcome {
                exit_code: 1,
                stdout: String::new(),
                stderr: stderr.to_string(),
                timed_out: false,
            });
        }

        pub fn commands(&self) -> Vec<String> {
            self.commands.lock().clone()
        }
    }

    #[async_trait]
    impl Sandbox for FakeSandbox {
        fn write_file(&self, path: &str, content: &str) -> Result<(), SandboxError> {
            self.put_file(path, content);
            Ok(())
        }

        fn read_file(&self, path: &str) -> Result<Option<String>, SandboxError> {
            Ok(self.file(path))
        }

        async fn exec(&self, command: &str, _timeout: Duration) -> Result<ExecOutcome, SandboxError> {
            self.commands.lock().push(command.to_string());
            Ok(self.outcomes.lock().pop_front().unwrap_or(ExecOutcome {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
                timed_out: false,
            }))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSandbox;

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;
