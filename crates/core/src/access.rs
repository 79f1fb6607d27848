// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-gate decision for a (user, course) pair
//!
//! Pure function of the schedule and the injected time. Called on every
//! content view, so it never touches storage or the host.

use crate::remaining::format_remaining;
use crate::schedule::{Schedule, ScheduleStatus};
use crate::time::format_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why access was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    NotYetStarted,
}

/// Access outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum Access {
    Allow,
    Deny(DenyReason),
}

/// Result handed back to the host's content gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// False when no schedule exists; the host applies its own default
    pub has_schedule: bool,
    pub access: Access,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduleStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_start: Option<DateTime<Utc>>,
}

impl AccessDecision {
    fn unscheduled() -> Self {
        Self {
            has_schedule: false,
            access: Access::Allow,
            message: None,
            status: None,
            scheduled_start: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.access == Access::Allow
    }
}

/// Decide access from the schedule governing the pair, if any
pub fn decide(schedule: Option<&Schedule>, now: DateTime<Utc>) -> AccessDecision {
    let Some(schedule) = schedule else {
        return AccessDecision::unscheduled();
    };

    let (access, message) = match schedule.status {
        ScheduleStatus::Pending => (
            Access::Deny(DenyReason::NotYetStarted),
            Some(availability_message(schedule.scheduled_start, now)),
        ),
        ScheduleStatus::Activated => (Access::Allow, None),
    };

    AccessDecision {
        has_schedule: true,
        access,
        message,
        status: Some(schedule.status),
        scheduled_start: Some(schedule.scheduled_start),
    }
}

fn availability_message(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!(
        "This course will be available on {} ({})",
        format_timestamp(start),
        format_remaining(start - now)
    )
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
