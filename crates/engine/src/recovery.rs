// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stateless error classification and the retry decision.
//!
//! The central recovery principle: a failure inside the fix cycle
//! (`GENERATING` through `REVIEWING`) is treated as evidence the generated
//! fix is wrong, so recovery rewinds to `GENERATING` and regenerates rather
//! than re-running the failing stage.

use crate::coordinator::StageError;
use mend_core::{ErrorInfo, State};

pub const FATAL_ERROR: &str = "FATAL_ERROR";
pub const RETRYABLE_ERROR: &str = "RETRYABLE_ERROR";
pub const TRANSIENT_ERROR: &str = "TRANSIENT_ERROR";
pub const UNRECOVERABLE_ERROR: &str = "UNRECOVERABLE_ERROR";

/// Message substrings that mark a failure as unrecoverable regardless of
/// where it happened. Matching is case-insensitive.
const FATAL_PATTERNS: &[&str] = &[
    "authentication failed",
    "bad credentials",
    "unauthorized",
    "invalid api key",
    "missing required",
    "invalid configuration",
    "no handler registered",
];

/// Message substrings that mark a failure as transient infrastructure
/// trouble. Handlers retry these internally; one surfacing here already
/// exhausted that budget.
const TRANSIENT_PATTERNS: &[&str] = &[
    "rate limit",
    "too many requests",
    "429",
    "connection reset",
    "econnreset",
    "socket hang up",
    "timed out",
    "timeout",
    "etimedout",
    "500",
    "502",
    "503",
    "504",
    "internal server error",
    "bad gateway",
    "service unavailable",
];

/// Failure severity tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Transient,
    Retryable,
    Fatal,
}

mend_core::simple_display! {
    Severity {
        Transient => "transient",
        Retryable => "retryable",
        Fatal => "fatal",
    }
}

/// Result of classifying one stage failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub details: Option<String>,
    pub retry_target: Option<State>,
}

impl Classification {
    /// Error payload for the run record. `verbose` keeps the details.
    pub fn to_error_info(&self, verbose: bool) -> ErrorInfo {
        let mut info = ErrorInfo::new(self.code, self.message.clone());
        if verbose {
            info.details = self.details.clone();
        }
        info
    }

    /// Rebuild a classification from a persisted error payload, so a
    /// resumed process can still answer the retry question.
    pub fn from_error_info(info: &ErrorInfo) -> Self {
        let (severity, code, retry_target) = match info.code.as_str() {
            RETRYABLE_ERROR => (Severity::Retryable, RETRYABLE_ERROR, Some(State::Generating)),
            TRANSIENT_ERROR => (Severity::Transient, TRANSIENT_ERROR, None),
            FATAL_ERROR => (Severity::Fatal, FATAL_ERROR, None),
            _ => (Severity::Fatal, UNRECOVERABLE_ERROR, None),
        };
        Self {
            severity,
            code,
            message: info.message.clone(),
            details: info.details.clone(),
            retry_target,
        }
    }
}

fn matches_any(message: &str, patterns: &[&str]) -> bool {
    let lowered = message.to_lowercase();
    patterns.iter().any(|p| lowered.contains(p))
}

/// Classifier plus per-run retry budget.
#[derive(Debug, Clone)]
pub struct RecoveryManager {
    max_attempts: u32,
}

impl Default for RecoveryManager {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RecoveryManager {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Classify a failure given the state it occurred in. Rules apply in
    /// order: fatal patterns, fix-cycle position, transient patterns, then
    /// unrecoverable.
    pub fn classify(&self, error: &StageError, state: State) -> Classification {
        let message = error.message.clone();
        let details = error.details.clone();

        if matches_any(&message, FATAL_PATTERNS) {
            return Classification {
                severity: Severity::Fatal,
                code: FATAL_ERROR,
                message,
                details,
                retry_target: None,
            };
        }
        if state.is_fix_cycle() {
            return Classification {
                severity: Severity::Retryable,
                code: RETRYABLE_ERROR,
                message,
                details,
                retry_target: Some(State::Generating),
            };
        }
        if matches_any(&message, TRANSIENT_PATTERNS) {
            return Classification {
                severity: Severity::Transient,
                code: TRANSIENT_ERROR,
                message,
                details,
                retry_target: None,
            };
        }
        Classification {
            severity: Severity::Fatal,
            code: UNRECOVERABLE_ERROR,
            message,
            details,
            retry_target: None,
        }
    }

    /// Whether another attempt is permitted.
    pub fn should_retry(&self, attempt: u32, classification: &Classification) -> bool {
        classification.severity == Severity::Retryable
            && classification.retry_target.is_some()
            && attempt < self.max_attempts
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
