// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable output. The only module that prints to stdout.

use mend_core::RunRecord;
use mend_engine::{RunReport, RunStatus};

pub fn print_report(report: &RunReport) {
    println!("run:        {}", report.run_id);
    println!("status:     {}", report.status);
    println!("state:      {}", report.final_state);
    println!("attempt:    {}", report.attempt);
    println!("duration:   {}ms", report.duration_ms);
    if let Some(costs) = &report.data.costs {
        println!("llm:        {} calls, {} tokens", costs.llm_calls, costs.total_tokens);
    }
    if let Some(submission) = &report.data.submission {
        println!("change:     #{} {}", submission.pr_number, submission.pr_url);
    } else if report.status == RunStatus::Completed {
        println!("change:     (dry run, nothing submitted)");
    }
    if let Some(error) = &report.error {
        println!("error:      [{}] {}", error.code, error.message);
        if let Some(details) = &error.details {
            println!("details:    {details}");
        }
    }
}

pub fn print_status(record: &RunRecord) {
    println!("run:        {}", record.run_id);
    println!("state:      {}", record.current_state);
    println!("attempt:    {}", record.attempt);
    println!("updated:    {}", record.updated_at);
    if let Some(error) = &record.error {
        println!("error:      [{}] {}", error.code, error.message);
    }
}

pub fn print_history(record: &RunRecord) {
    println!("run:        {}", record.run_id);
    for (i, state) in record.history.iter().enumerate() {
        println!("{:>3}  {state}", i + 1);
    }
    println!("{:>3}  {} (current)", record.history.len() + 1, record.current_state);
}

/// Exit code for a finished run: suspended and completed runs are not
/// process failures.
pub fn exit_code(report: &RunReport) -> i32 {
    match report.status {
        RunStatus::Completed | RunStatus::Paused => 0,
        RunStatus::Cancelled => 130,
        RunStatus::Failed | RunStatus::Running => 1,
    }
}
