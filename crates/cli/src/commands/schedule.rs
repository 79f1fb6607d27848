// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule management commands

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use esched_core::{
    parse_timestamp, CourseId, NewSchedule, ScheduleFilter, ScheduleId, ScheduleStatus, UserId,
};

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// Schedule a course start for a user
    Create {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        course: u64,
        /// RFC 3339 or "YYYY-MM-DD HH:MM[:SS]" (UTC)
        #[arg(long, value_parser = parse_start)]
        start: DateTime<Utc>,
        /// Administrator creating the schedule
        #[arg(long = "by")]
        created_by: u64,
        #[arg(long)]
        note: Option<String>,
    },
    /// List schedules
    List {
        #[arg(long)]
        status: Option<ScheduleStatus>,
        #[arg(long)]
        user: Option<u64>,
        #[arg(long)]
        course: Option<u64>,
    },
    /// Show one schedule
    Show { id: u64 },
    /// Move the start time and/or change the note
    Edit {
        id: u64,
        #[arg(long, value_parser = parse_start)]
        start: Option<DateTime<Utc>>,
        #[arg(long, conflicts_with = "clear_note")]
        note: Option<String>,
        #[arg(long)]
        clear_note: bool,
    },
    /// Delete a schedule (any host enrollment stays)
    Delete { id: u64 },
    /// Activate a pending schedule now
    Activate { id: u64 },
}

pub fn parse_start(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(s).map_err(|e| e.to_string())
}

impl ScheduleCommand {
    /// The note change requested by `edit`
    fn note_change(note: Option<String>, clear_note: bool) -> Option<Option<String>> {
        if clear_note {
            Some(None)
        } else {
            note.map(Some)
        }
    }
}

pub async fn handle(command: ScheduleCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        ScheduleCommand::Create {
            user,
            course,
            start,
            created_by,
            note,
        } => {
            let schedule = client
                .create(NewSchedule {
                    user_id: UserId(user),
                    course_id: CourseId(course),
                    scheduled_start: start,
                    created_by: UserId(created_by),
                    note,
                })
                .await?;
            output::print(
                &schedule,
                || format!("Created schedule {}\n{}", schedule.id, output::schedule_detail(&schedule)),
                format,
            );
        }

        ScheduleCommand::List {
            status,
            user,
            course,
        } => {
            let schedules = client
                .list(ScheduleFilter {
                    status,
                    user_id: user.map(UserId),
                    course_id: course.map(CourseId),
                })
                .await?;
            output::print(&schedules, || output::schedule_table(&schedules), format);
        }

        ScheduleCommand::Show { id } => {
            let schedule = client.get(ScheduleId(id)).await?;
            output::print(&schedule, || output::schedule_detail(&schedule), format);
        }

        ScheduleCommand::Edit {
            id,
            start,
            note,
            clear_note,
        } => {
            let note = ScheduleCommand::note_change(note, clear_note);
            if start.is_none() && note.is_none() {
                anyhow::bail!("nothing to change: pass --start, --note or --clear-note");
            }
            let (schedule, message) = client.update(ScheduleId(id), start, note).await?;
            output::print(
                &schedule,
                || {
                    let headline = message.unwrap_or_else(|| "Schedule updated".to_string());
                    format!("{}\n{}", headline, output::schedule_detail(&schedule))
                },
                format,
            );
        }

        ScheduleCommand::Delete { id } => {
            let schedule = client.delete(ScheduleId(id)).await?;
            output::print(
                &schedule,
                || {
                    let mut text = format!("Deleted schedule {}\n", schedule.id);
                    if let Some(external_ref) = &schedule.external_ref {
                        text.push_str(&format!(
                            "  Host enrollment {} was left in place\n",
                            external_ref
                        ));
                    }
                    text
                },
                format,
            );
        }

        ScheduleCommand::Activate { id } => {
            let schedule = client.activate(ScheduleId(id)).await?;
            output::print(
                &schedule,
                || format!("Activated schedule {}\n{}", schedule.id, output::schedule_detail(&schedule)),
                format,
            );
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
