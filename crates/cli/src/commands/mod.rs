// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subcommands.

pub mod history;
pub mod resume;
pub mod run;
pub mod status;

use crate::config::MendConfig;
use mend_adapters::{GithubClient, HttpLlmClient, LocalSandbox, RegexSearch};
use mend_engine::{default_coordinator, Coordinator, StageDeps, SubmitMode};
use std::sync::Arc;

/// Build the real adapter set and stage registry from configuration.
pub(crate) fn build_coordinator(
    config: &MendConfig,
    submit_mode: SubmitMode,
) -> anyhow::Result<Coordinator> {
    let host = Arc::new(GithubClient::new(config.require_github_token()?)?);
    let llm = Arc::new(HttpLlmClient::new(
        &config.llm_base_url,
        config.require_llm_api_key()?,
        &config.llm_model,
    )?);
    let search = Arc::new(RegexSearch::new(&config.workspace));
    let sandbox = Arc::new(LocalSandbox::new(&config.workspace));

    let deps = StageDeps { host, llm, search, sandbox };
    Ok(default_coordinator(deps, &config.pipeline_settings(submit_mode)))
}

/// Cancel the run on Ctrl-C; a second interrupt is absorbed by the same
/// cooperative flag.
pub(crate) fn install_interrupt_handler(control: mend_engine::WorkflowControl) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling at the next stage boundary");
            control.cancel();
        }
    });
}
