// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mend-storage: durable persistence of run records

mod json;
#[cfg(any(test, feature = "test-support"))]
mod memory;

pub use json::JsonStateStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::{FailingStateStore, MemoryStateStore};

use mend_core::RunRecord;
use thiserror::Error;

/// Errors from run-record persistence. Only I/O and encoding faults; an
/// absent record is not an error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable persistence of a single run record.
///
/// One store handle maps to exactly one record; concurrent writers to the
/// same handle are unsupported.
pub trait StateStore: Send + Sync {
    /// Write the full record, atomically with respect to readers.
    fn save(&self, record: &RunRecord) -> Result<(), StorageError>;

    /// Load the record; `None` when no prior record exists. A malformed
    /// record is treated as absent (and logged).
    fn load(&self) -> Result<Option<RunRecord>, StorageError>;

    /// Whether a prior record exists.
    fn exists(&self) -> bool;
}
