// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transition triggers: per-stage success events and global controls.

use serde::{Deserialize, Serialize};

/// Symbolic event driving a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trigger {
    Start,
    AnalysisOk,
    SearchOk,
    PlanOk,
    GenerationOk,
    ApplyOk,
    BuildOk,
    TestOk,
    ReviewOk,
    SubmitOk,
    Pause,
    Resume,
    Cancel,
    Fail,
    Retry,
}

impl Trigger {
    /// Per-stage success triggers (the forward path).
    pub fn is_success(self) -> bool {
        matches!(
            self,
            Trigger::AnalysisOk
                | Trigger::SearchOk
                | Trigger::PlanOk
                | Trigger::GenerationOk
                | Trigger::ApplyOk
                | Trigger::BuildOk
                | Trigger::TestOk
                | Trigger::ReviewOk
                | Trigger::SubmitOk
        )
    }

    /// Global control triggers, valid from whole families of states.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            Trigger::Pause | Trigger::Resume | Trigger::Cancel | Trigger::Fail | Trigger::Retry
        )
    }
}

crate::simple_display! {
    Trigger {
        Start => "START",
        AnalysisOk => "ANALYSIS_OK",
        SearchOk => "SEARCH_OK",
        PlanOk => "PLAN_OK",
        GenerationOk => "GENERATION_OK",
        ApplyOk => "APPLY_OK",
        BuildOk => "BUILD_OK",
        TestOk => "TEST_OK",
        ReviewOk => "REVIEW_OK",
        SubmitOk => "SUBMIT_OK",
        Pause => "PAUSE",
        Resume => "RESUME",
        Cancel => "CANCEL",
        Fail => "FAIL",
        Retry => "RETRY",
    }
}
