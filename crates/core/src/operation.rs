// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log

use crate::schedule::{Schedule, ScheduleId, ScheduleStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operations that can be persisted to the WAL
///
/// Replaying these in order must rebuild the schedule table exactly,
/// including ids and versions, so every mutation is recorded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Insert a new schedule row
    ScheduleCreate { schedule: Schedule },

    /// Administrative edit of start time and/or note
    ScheduleEdit {
        id: ScheduleId,
        scheduled_start: DateTime<Utc>,
        #[serde(default)]
        note: Option<String>,
        at: DateTime<Utc>,
    },

    /// Status change (activation or reversal)
    ScheduleTransition {
        id: ScheduleId,
        status: ScheduleStatus,
        #[serde(default)]
        external_ref: Option<String>,
        at: DateTime<Utc>,
    },

    /// Hard delete
    ScheduleDelete { id: ScheduleId },
}

impl Operation {
    /// The schedule this operation touches
    pub fn schedule_id(&self) -> ScheduleId {
        match self {
            Operation::ScheduleCreate { schedule } => schedule.id,
            Operation::ScheduleEdit { id, .. }
            | Operation::ScheduleTransition { id, .. }
            | Operation::ScheduleDelete { id } => *id,
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
