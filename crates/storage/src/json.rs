// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed store: one `state.json` per run directory.

use crate::{StateStore, StorageError};
use mend_core::{RunId, RunRecord};
use std::path::{Path, PathBuf};

/// Persists the record as a single pretty-printed JSON document.
///
/// Saves go through a sibling temp file plus rename, so a crash mid-save
/// never leaves a partial document behind.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional layout: `<runs_root>/<run_id>/state.json`.
    pub fn for_run(runs_root: &Path, run_id: &RunId) -> Self {
        Self::new(runs_root.join(run_id.as_str()).join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn save(&self, record: &RunRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(record)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<RunRecord>, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "malformed run record, treating as absent"
                );
                Ok(None)
            }
        }
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
