// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule records
//!
//! A schedule says "give this user this course, starting at this time".
//! Until the start passes it is `Pending` and the user has no access; the
//! lifecycle engine then creates the host enrollment and flips it to
//! `Activated`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                $name(n)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a schedule, assigned by the store
    ScheduleId
);
numeric_id!(
    /// Identifier of a user in the host system
    UserId
);
numeric_id!(
    /// Identifier of a course in the host system
    CourseId
);

/// Lifecycle status of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    /// Waiting for its start time (or for the next tick to pick it up)
    Pending,
    /// The host enrollment exists; access is governed by the host
    Activated,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "pending",
            ScheduleStatus::Activated => "activated",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown schedule status: {0}")]
pub struct StatusParseError(pub String);

impl FromStr for ScheduleStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScheduleStatus::Pending),
            "activated" => Ok(ScheduleStatus::Activated),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

/// A scheduled enrollment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub scheduled_start: DateTime<Utc>,
    pub status: ScheduleStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Identifier of the host enrollment this engine created, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    /// Optimistic concurrency token, bumped on every mutation
    pub version: u64,
}

impl Schedule {
    pub fn is_pending(&self) -> bool {
        self.status == ScheduleStatus::Pending
    }

    /// Whether the start time has been reached at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_start <= now
    }

    /// The (user, course) pair this schedule gates
    pub fn pair(&self) -> (UserId, CourseId) {
        (self.user_id, self.course_id)
    }
}

/// Input for creating a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSchedule {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub scheduled_start: DateTime<Utc>,
    pub created_by: UserId,
    #[serde(default)]
    pub note: Option<String>,
}

/// Listing filter; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleFilter {
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub course_id: Option<CourseId>,
}

impl ScheduleFilter {
    pub fn matches(&self, schedule: &Schedule) -> bool {
        self.status.map_or(true, |s| s == schedule.status)
            && self.user_id.map_or(true, |u| u == schedule.user_id)
            && self.course_id.map_or(true, |c| c == schedule.course_id)
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
