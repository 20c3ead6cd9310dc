// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SEARCHING`: turn the analysis into patterns and collect code hits.

use crate::coordinator::{StageError, StageHandler};
use async_trait::async_trait;
use mend_adapters::CodeSearch;
use mend_core::{WorkflowData, WorkflowUpdate};
use std::sync::Arc;

pub struct SearchStage {
    search: Arc<dyn CodeSearch>,
}

impl SearchStage {
    pub fn new(search: Arc<dyn CodeSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl StageHandler for SearchStage {
    async fn execute(&self, data: &WorkflowData) -> Result<WorkflowUpdate, StageError> {
        let analysis = data
            .analysis
            .as_ref()
            .ok_or_else(|| StageError::new("missing required analysis before search"))?;

        // Keywords are treated as literal terms; file stems narrow the hunt
        // to the model's suspects.
        let mut patterns: Vec<String> =
            analysis.keywords.iter().map(|k| regex::escape(k)).collect();
        for file in &analysis.suspect_files {
            if let Some(stem) = std::path::Path::new(file).file_stem() {
                patterns.push(regex::escape(&stem.to_string_lossy()));
            }
        }
        patterns.dedup();

        let hits = self.search.search(&patterns)?;
        Ok(WorkflowUpdate { search_results: Some(hits), ..Default::default() })
    }
}
