// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration: TOML file plus environment overrides for secrets.

use mend_engine::{PipelineSettings, SubmitMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Message deliberately contains "missing required" so a run that gets
    /// this far classifies as fatal rather than retryable.
    #[error("missing required {0}")]
    MissingCredential(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MendConfig {
    pub github_token: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    /// Where run records live; one directory per run id.
    pub runs_root: PathBuf,
    /// Working tree the fix is applied and built in.
    pub workspace: PathBuf,
    pub build_command: String,
    pub test_command: String,
    pub command_timeout_secs: u64,
    pub max_attempts: u32,
    pub base_branch: String,
    /// Open a real change request on success instead of a dry-run preview.
    pub auto_pr: bool,
}

impl Default for MendConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            github_token: None,
            llm_api_key: None,
            llm_base_url: "https://api.openai.com/v1".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            runs_root: home.join(".mend/runs"),
            workspace: PathBuf::from("."),
            build_command: "cargo build".to_string(),
            test_command: "cargo test".to_string(),
            command_timeout_secs: 600,
            max_attempts: 3,
            base_branch: "main".to_string(),
            auto_pr: false,
        }
    }
}

impl MendConfig {
    /// Load from an explicit path, `./mend.toml`, or
    /// `~/.config/mend/mend.toml`, in that order; defaults otherwise.
    /// Environment overrides apply last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let candidate = explicit.map(Path::to_path_buf).or_else(|| {
            let local = PathBuf::from("mend.toml");
            if local.is_file() {
                return Some(local);
            }
            let global = dirs::config_dir().map(|d| d.join("mend/mend.toml"));
            global.filter(|p| p.is_file())
        });

        let mut config = match candidate {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("MEND_GITHUB_TOKEN") {
            self.github_token = Some(token);
        }
        if let Ok(key) = std::env::var("MEND_LLM_API_KEY") {
            self.llm_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("MEND_LLM_BASE_URL") {
            self.llm_base_url = url;
        }
        if let Ok(model) = std::env::var("MEND_LLM_MODEL") {
            self.llm_model = model;
        }
        if let Ok(root) = std::env::var("MEND_RUNS_ROOT") {
            self.runs_root = PathBuf::from(root);
        }
        if let Ok(workspace) = std::env::var("MEND_WORKSPACE") {
            self.workspace = PathBuf::from(workspace);
        }
    }

    pub fn require_github_token(&self) -> Result<&str, ConfigError> {
        self.github_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingCredential("GitHub token (set MEND_GITHUB_TOKEN)"))
    }

    pub fn require_llm_api_key(&self) -> Result<&str, ConfigError> {
        self.llm_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential("LLM API key (set MEND_LLM_API_KEY)"))
    }

    pub fn pipeline_settings(&self, submit_mode: SubmitMode) -> PipelineSettings {
        PipelineSettings {
            build_command: self.build_command.clone(),
            test_command: self.test_command.clone(),
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            base_branch: self.base_branch.clone(),
            submit_mode,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
