// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! esched-core: domain model for scheduled course enrollment
//!
//! This crate provides:
//! - The `Schedule` value type, its ids and the closed status enum
//! - WAL operations that describe every mutation of the schedule table
//! - A clock abstraction so that "now" is always injected
//! - Timestamp parsing, time-remaining formatting and the pure access decision

pub mod access;
pub mod clock;
pub mod operation;
pub mod remaining;
pub mod schedule;
pub mod time;

pub use access::{decide, Access, AccessDecision, DenyReason};
pub use clock::{Clock, FakeClock, SystemClock};
pub use operation::Operation;
pub use remaining::format_remaining;
pub use schedule::{
    CourseId, NewSchedule, Schedule, ScheduleFilter, ScheduleId, ScheduleStatus, StatusParseError,
    UserId,
};
pub use time::{format_timestamp, parse_timestamp, TimeParseError};
