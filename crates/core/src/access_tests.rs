// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::schedule::{CourseId, ScheduleId, UserId};
use chrono::{Duration, TimeZone};

fn schedule_at(start: DateTime<Utc>, status: ScheduleStatus) -> Schedule {
    Schedule {
        id: ScheduleId(1),
        user_id: UserId(5),
        course_id: CourseId(10),
        scheduled_start: start,
        status,
        created_by: UserId(1),
        created_at: start - Duration::days(7),
        updated_at: start - Duration::days(7),
        note: None,
        external_ref: None,
        version: 1,
    }
}

#[test]
fn no_schedule_defers_to_host() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let decision = decide(None, now);
    assert!(!decision.has_schedule);
    assert!(decision.message.is_none());
}

#[test]
fn pending_schedule_denies_with_countdown() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
    let schedule = schedule_at(start, ScheduleStatus::Pending);

    let decision = decide(Some(&schedule), now);

    assert!(decision.has_schedule);
    assert_eq!(decision.access, Access::Deny(DenyReason::NotYetStarted));
    assert_eq!(
        decision.message.as_deref(),
        Some("This course will be available on January 1, 2025 9:00 am (9 hours, 1 minute)")
    );
}

#[test]
fn pending_past_start_still_denies_until_activated() {
    // Access follows the engine's transition, not the raw timestamp
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    let schedule = schedule_at(start, ScheduleStatus::Pending);

    let decision = decide(Some(&schedule), start + Duration::minutes(5));

    assert!(!decision.is_allowed());
    assert!(decision.message.unwrap().ends_with("(available now)"));
}

#[test]
fn activated_schedule_allows() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    let schedule = schedule_at(start, ScheduleStatus::Activated);

    let decision = decide(Some(&schedule), start + Duration::minutes(1));

    assert!(decision.is_allowed());
    assert_eq!(decision.status, Some(ScheduleStatus::Activated));
    assert!(decision.message.is_none());
}

#[test]
fn decision_serializes_with_tagged_access() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    let schedule = schedule_at(start, ScheduleStatus::Pending);
    let json = serde_json::to_value(decide(Some(&schedule), start)).unwrap();
    assert_eq!(json["access"]["outcome"], "deny");
    assert_eq!(json["access"]["reason"], "not_yet_started");
}

use proptest::prelude::*;

proptest! {
    #[test]
    fn future_start_is_never_allowed(ahead_secs in 1i64..10_000_000) {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let schedule = schedule_at(now + Duration::seconds(ahead_secs), ScheduleStatus::Pending);
        prop_assert!(!decide(Some(&schedule), now).is_allowed());
    }
}
