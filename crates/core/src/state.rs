// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run states: operational pipeline phases plus control states.

use crate::trigger::Trigger;
use serde::{Deserialize, Serialize};

/// Discrete phase of a run.
///
/// Operational states are the pipeline phases a handler runs in (plus the
/// terminal `Done`); control states (`Paused`, `Error`, `Cancelled`) never
/// run a handler and never appear in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    Analyzing,
    Searching,
    Planning,
    Generating,
    Applying,
    Building,
    Testing,
    Reviewing,
    Submitting,
    Done,
    Paused,
    Error,
    Cancelled,
}

impl State {
    /// Control states suspend or end a run without running a handler.
    pub fn is_control(self) -> bool {
        matches!(self, State::Paused | State::Error | State::Cancelled)
    }

    /// Everything that is not a control state.
    pub fn is_operational(self) -> bool {
        !self.is_control()
    }

    /// Terminal states admit no further transitions in practice.
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Done | State::Cancelled)
    }

    /// Suspended states can be continued via `RESUME` or `RETRY`.
    pub fn is_suspended(self) -> bool {
        matches!(self, State::Paused | State::Error)
    }

    /// The fix cycle: failures here rewind to `Generating` on retry.
    pub fn is_fix_cycle(self) -> bool {
        matches!(
            self,
            State::Generating
                | State::Applying
                | State::Building
                | State::Testing
                | State::Reviewing
        )
    }

    /// The trigger that advances out of this state on handler success.
    ///
    /// `None` for `Idle` (advanced by `START`), `Done`, and control states.
    pub fn success_trigger(self) -> Option<Trigger> {
        match self {
            State::Analyzing => Some(Trigger::AnalysisOk),
            State::Searching => Some(Trigger::SearchOk),
            State::Planning => Some(Trigger::PlanOk),
            State::Generating => Some(Trigger::GenerationOk),
            State::Applying => Some(Trigger::ApplyOk),
            State::Building => Some(Trigger::BuildOk),
            State::Testing => Some(Trigger::TestOk),
            State::Reviewing => Some(Trigger::ReviewOk),
            State::Submitting => Some(Trigger::SubmitOk),
            _ => None,
        }
    }
}

crate::simple_display! {
    State {
        Idle => "IDLE",
        Analyzing => "ANALYZING",
        Searching => "SEARCHING",
        Planning => "PLANNING",
        Generating => "GENERATING",
        Applying => "APPLYING",
        Building => "BUILDING",
        Testing => "TESTING",
        Reviewing => "REVIEWING",
        Submitting => "SUBMITTING",
        Done => "DONE",
        Paused => "PAUSED",
        Error => "ERROR",
        Cancelled => "CANCELLED",
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
