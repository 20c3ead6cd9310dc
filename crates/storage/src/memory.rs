// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory stores for tests.

use crate::{StateStore, StorageError};
use mend_core::RunRecord;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Shared in-memory store. Clones observe the same record, which lets a test
/// hand one handle to a machine and keep another for assertions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    record: Arc<Mutex<Option<RunRecord>>>,
    saves: Arc<AtomicU32>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves observed.
    pub fn save_count(&self) -> u32 {
        self.saves.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored record.
    pub fn snapshot(&self) -> Option<RunRecord> {
        self.record.lock().clone()
    }
}

impl StateStore for MemoryStateStore {
    fn save(&self, record: &RunRecord) -> Result<(), StorageError> {
        *self.record.lock() = Some(record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self) -> Result<Option<RunRecord>, StorageError> {
        Ok(self.record.lock().clone())
    }

    fn exists(&self) -> bool {
        self.record.lock().is_some()
    }
}

/// Store whose saves can be made to fail, for commit-revert tests.
#[derive(Debug, Clone, Default)]
pub struct FailingStateStore {
    inner: MemoryStateStore,
    fail_saves: Arc<AtomicBool>,
}

impl FailingStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle save failures.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the stored record.
    pub fn snapshot(&self) -> Option<RunRecord> {
        self.inner.snapshot()
    }
}

impl StateStore for FailingStateStore {
    fn save(&self, record: &RunRecord) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("save rejected")));
        }
        self.inner.save(record)
    }

    fn load(&self) -> Result<Option<RunRecord>, StorageError> {
        self.inner.load()
    }

    fn exists(&self) -> bool {
        self.inner.exists()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
