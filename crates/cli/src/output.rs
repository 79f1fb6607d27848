// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use std::fmt::Write;

use clap::ValueEnum;
use esched_core::{format_timestamp, Access, AccessDecision, Schedule};
use esched_engine::BulkOutcome;
use esched_storage::ScheduleStats;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `value` as JSON, or `text` in text mode
pub fn print<T: Serialize>(value: &T, text: impl FnOnce() -> String, format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", text()),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

pub fn schedule_table(schedules: &[Schedule]) -> String {
    if schedules.is_empty() {
        return "No schedules\n".to_string();
    }

    let mut out = format!(
        "{:<6} {:<8} {:<8} {:<10} {:<20} NOTE\n",
        "ID", "USER", "COURSE", "STATUS", "START"
    );
    for s in schedules {
        let _ = writeln!(
            out,
            "{:<6} {:<8} {:<8} {:<10} {:<20} {}",
            s.id.to_string(),
            s.user_id.to_string(),
            s.course_id.to_string(),
            s.status.as_str(),
            s.scheduled_start.format("%Y-%m-%d %H:%M").to_string(),
            truncate(s.note.as_deref().unwrap_or("-"), 40)
        );
    }
    out
}

pub fn schedule_detail(s: &Schedule) -> String {
    let mut out = format!("Schedule: {}\n", s.id);
    let _ = writeln!(out, "  User: {}", s.user_id);
    let _ = writeln!(out, "  Course: {}", s.course_id);
    let _ = writeln!(out, "  Status: {}", s.status);
    let _ = writeln!(out, "  Start: {}", format_timestamp(s.scheduled_start));
    if let Some(external_ref) = &s.external_ref {
        let _ = writeln!(out, "  Enrollment: {}", external_ref);
    }
    if let Some(note) = &s.note {
        let _ = writeln!(out, "  Note: {}", note);
    }
    let _ = writeln!(out, "  Created: {} by {}", format_timestamp(s.created_at), s.created_by);
    let _ = writeln!(out, "  Updated: {}", format_timestamp(s.updated_at));
    out
}

pub fn decision_text(decision: &AccessDecision) -> String {
    let verdict = match decision.access {
        Access::Allow => "allowed",
        Access::Deny(_) => "denied",
    };
    let mut out = format!("Access: {}\n", verdict);
    if !decision.has_schedule {
        out.push_str("  No schedule; host enrollment rules apply\n");
    }
    if let Some(status) = decision.status {
        let _ = writeln!(out, "  Schedule status: {}", status);
    }
    if let Some(message) = &decision.message {
        let _ = writeln!(out, "  {}", message);
    }
    out
}

pub fn status_text(uptime_secs: u64, stats: &ScheduleStats) -> String {
    let mut out = format!(
        "Daemon up {}h {}m\n",
        uptime_secs / 3600,
        (uptime_secs % 3600) / 60
    );
    let _ = writeln!(out, "  Pending: {}", stats.pending);
    let _ = writeln!(out, "  Activated: {}", stats.activated);
    let _ = writeln!(out, "  Due now: {}", stats.due);
    match stats.next_activation {
        Some(next) => {
            let _ = writeln!(out, "  Next activation: {}", format_timestamp(next));
        }
        None => out.push_str("  Next activation: none\n"),
    }
    out
}

pub fn bulk_text(outcome: &BulkOutcome) -> String {
    let mut out = format!("Processed {} schedule(s)\n", outcome.processed);
    if !outcome.errors.is_empty() {
        let _ = writeln!(out, "{} failed:", outcome.errors.len());
        for failure in &outcome.errors {
            let _ = writeln!(out, "  {}: {}", failure.id, failure.message);
        }
    }
    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
