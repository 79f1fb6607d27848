// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn sample(status: ScheduleStatus) -> Schedule {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    Schedule {
        id: ScheduleId(1),
        user_id: UserId(5),
        course_id: CourseId(10),
        scheduled_start: at,
        status,
        created_by: UserId(1),
        created_at: at,
        updated_at: at,
        note: None,
        external_ref: None,
        version: 1,
    }
}

#[test]
fn status_round_trips_through_strings() {
    for status in [ScheduleStatus::Pending, ScheduleStatus::Activated] {
        assert_eq!(status.as_str().parse::<ScheduleStatus>().unwrap(), status);
    }
}

#[test]
fn legacy_statuses_are_rejected() {
    for legacy in ["scheduled", "active", "expired"] {
        assert_eq!(
            legacy.parse::<ScheduleStatus>(),
            Err(StatusParseError(legacy.to_string()))
        );
    }
}

#[test]
fn status_serializes_lowercase() {
    let json = serde_json::to_string(&ScheduleStatus::Activated).unwrap();
    assert_eq!(json, "\"activated\"");
}

#[test]
fn due_is_inclusive_of_start() {
    let schedule = sample(ScheduleStatus::Pending);
    assert!(schedule.is_due(schedule.scheduled_start));
    assert!(!schedule.is_due(schedule.scheduled_start - chrono::Duration::seconds(1)));
}

#[test]
fn filter_matches_on_every_set_field() {
    let schedule = sample(ScheduleStatus::Pending);

    assert!(ScheduleFilter::default().matches(&schedule));
    assert!(ScheduleFilter {
        status: Some(ScheduleStatus::Pending),
        user_id: Some(UserId(5)),
        course_id: Some(CourseId(10)),
    }
    .matches(&schedule));
    assert!(!ScheduleFilter {
        status: Some(ScheduleStatus::Activated),
        ..Default::default()
    }
    .matches(&schedule));
    assert!(!ScheduleFilter {
        course_id: Some(CourseId(11)),
        ..Default::default()
    }
    .matches(&schedule));
}

#[test]
fn optional_fields_are_omitted_from_json() {
    let json = serde_json::to_value(sample(ScheduleStatus::Pending)).unwrap();
    assert!(json.get("note").is_none());
    assert!(json.get("external_ref").is_none());
    assert_eq!(json["user_id"], 5);
}
