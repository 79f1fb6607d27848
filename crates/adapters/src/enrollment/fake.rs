// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake enrollment store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{EnrollmentAdapter, EnrollmentError, EnrollmentRecord, EnrollmentStatus, ExternalId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use esched_core::{CourseId, ScheduleId, UserId};
use std::sync::{Arc, Mutex};

/// Recorded enrollment call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentCall {
    Create {
        user_id: UserId,
        course_id: CourseId,
        start_time: DateTime<Utc>,
        ref_marker: String,
        ref_id: ScheduleId,
    },
    DeleteByRef {
        ref_marker: String,
        ref_id: ScheduleId,
    },
    Find {
        user_id: UserId,
        course_id: CourseId,
    },
}

#[derive(Default)]
struct FakeState {
    records: Vec<EnrollmentRecord>,
    next_id: u64,
    calls: Vec<EnrollmentCall>,
    fail_creates: bool,
    fail_deletes: bool,
    fail_finds: bool,
}

/// In-memory enrollment table with call recording and failure injection
#[derive(Clone, Default)]
pub struct FakeEnrollmentAdapter {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeEnrollmentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a record that was not created by the engine (no reference tag)
    pub fn seed_foreign(
        &self,
        user_id: UserId,
        course_id: CourseId,
        status: EnrollmentStatus,
    ) -> ExternalId {
        let mut state = self.state();
        state.next_id += 1;
        let id = ExternalId(format!("host-{}", state.next_id));
        state.records.push(EnrollmentRecord {
            id: id.clone(),
            user_id,
            course_id,
            status,
            start_time: None,
            ref_marker: None,
            ref_id: None,
        });
        id
    }

    /// Add an arbitrary record
    pub fn seed(&self, record: EnrollmentRecord) {
        self.state().records.push(record);
    }

    /// All records currently in the table
    pub fn records(&self) -> Vec<EnrollmentRecord> {
        self.state().records.clone()
    }

    /// Records tagged with `(ref_marker, ref_id)`
    pub fn records_for_ref(&self, ref_marker: &str, ref_id: ScheduleId) -> Vec<EnrollmentRecord> {
        self.state()
            .records
            .iter()
            .filter(|r| r.created_by(ref_marker, ref_id))
            .cloned()
            .collect()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<EnrollmentCall> {
        self.state().calls.clone()
    }

    /// Number of create calls seen so far
    pub fn create_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, EnrollmentCall::Create { .. }))
            .count()
    }

    pub fn fail_creates(&self, fail: bool) {
        self.state().fail_creates = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state().fail_deletes = fail;
    }

    pub fn fail_finds(&self, fail: bool) {
        self.state().fail_finds = fail;
    }
}

#[async_trait]
impl EnrollmentAdapter for FakeEnrollmentAdapter {
    async fn create_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
        start_time: DateTime<Utc>,
        ref_marker: &str,
        ref_id: ScheduleId,
    ) -> Result<ExternalId, EnrollmentError> {
        self.state().calls.push(EnrollmentCall::Create {
            user_id,
            course_id,
            start_time,
            ref_marker: ref_marker.to_string(),
            ref_id,
        });

        // Let concurrent callers interleave here, like a real network hop
        tokio::task::yield_now().await;

        let mut state = self.state();
        if state.fail_creates {
            return Err(EnrollmentError::Unavailable("injected create failure".into()));
        }
        state.next_id += 1;
        let id = ExternalId(format!("host-{}", state.next_id));
        state.records.push(EnrollmentRecord {
            id: id.clone(),
            user_id,
            course_id,
            status: EnrollmentStatus::Enrolled,
            start_time: Some(start_time),
            ref_marker: Some(ref_marker.to_string()),
            ref_id: Some(ref_id),
        });
        Ok(id)
    }

    async fn delete_enrollment_by_ref(
        &self,
        ref_marker: &str,
        ref_id: ScheduleId,
    ) -> Result<usize, EnrollmentError> {
        let mut state = self.state();
        state.calls.push(EnrollmentCall::DeleteByRef {
            ref_marker: ref_marker.to_string(),
            ref_id,
        });
        if state.fail_deletes {
            return Err(EnrollmentError::Unavailable("injected delete failure".into()));
        }
        let before = state.records.len();
        state.records.retain(|r| !r.created_by(ref_marker, ref_id));
        Ok(before - state.records.len())
    }

    async fn find_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<EnrollmentRecord>, EnrollmentError> {
        let mut state = self.state();
        state.calls.push(EnrollmentCall::Find { user_id, course_id });
        if state.fail_finds {
            return Err(EnrollmentError::Unavailable("injected find failure".into()));
        }
        let matching: Vec<&EnrollmentRecord> = state
            .records
            .iter()
            .filter(|r| r.user_id == user_id && r.course_id == course_id)
            .collect();
        Ok(matching
            .iter()
            .find(|r| r.status.is_active())
            .or(matching.first())
            .map(|r| (*r).clone()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
