// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

#[tokio::test]
async fn create_then_delete_by_ref() {
    let adapter = FakeEnrollmentAdapter::new();

    let id = adapter
        .create_enrollment(UserId(5), CourseId(10), start(), "esched", ScheduleId(1))
        .await
        .unwrap();

    let found = adapter
        .find_enrollment(UserId(5), CourseId(10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, id);
    assert!(found.created_by("esched", ScheduleId(1)));

    let deleted = adapter
        .delete_enrollment_by_ref("esched", ScheduleId(1))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert!(adapter.records().is_empty());
}

#[tokio::test]
async fn delete_by_ref_leaves_untagged_records() {
    let adapter = FakeEnrollmentAdapter::new();
    adapter.seed_foreign(UserId(5), CourseId(10), EnrollmentStatus::Enrolled);
    adapter
        .create_enrollment(UserId(5), CourseId(10), start(), "esched", ScheduleId(1))
        .await
        .unwrap();

    let deleted = adapter
        .delete_enrollment_by_ref("esched", ScheduleId(1))
        .await
        .unwrap();

    assert_eq!(deleted, 1);
    let left = adapter.records();
    assert_eq!(left.len(), 1);
    assert!(left[0].ref_marker.is_none());
}

#[tokio::test]
async fn find_prefers_active_record() {
    let adapter = FakeEnrollmentAdapter::new();
    adapter.seed_foreign(UserId(5), CourseId(10), EnrollmentStatus::Other);
    let active = adapter.seed_foreign(UserId(5), CourseId(10), EnrollmentStatus::Completed);

    let found = adapter
        .find_enrollment(UserId(5), CourseId(10))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.id, active);
}

#[tokio::test]
async fn injected_create_failure_records_call_but_no_row() {
    let adapter = FakeEnrollmentAdapter::new();
    adapter.fail_creates(true);

    let result = adapter
        .create_enrollment(UserId(5), CourseId(10), start(), "esched", ScheduleId(1))
        .await;

    assert!(matches!(result, Err(EnrollmentError::Unavailable(_))));
    assert_eq!(adapter.create_count(), 1);
    assert!(adapter.records().is_empty());
}

#[test]
fn unknown_host_status_decodes_as_other() {
    let json = r#"{"id":"77","user_id":5,"course_id":10,"status":"cancelled"}"#;

    let record: EnrollmentRecord = serde_json::from_str(json).unwrap();

    assert_eq!(record.status, EnrollmentStatus::Other);
    assert!(!record.status.is_active());
    assert!(record.ref_id.is_none());
}
