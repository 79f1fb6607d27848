// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host enrollment store adapter
//!
//! The host LMS keeps its own enrollment table. Records this engine creates
//! carry a reference marker plus the schedule id, which is the only handle
//! used to delete them again.

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{EnrollmentCall, FakeEnrollmentAdapter};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use esched_core::{CourseId, ScheduleId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from the host enrollment store
#[derive(Debug, Clone, Error)]
pub enum EnrollmentError {
    /// Transport failure, timeout or server error; worth retrying
    #[error("enrollment store unavailable: {0}")]
    Unavailable(String),
    /// The host refused the request
    #[error("enrollment store rejected request: {0}")]
    Rejected(String),
    #[error("unexpected enrollment store response: {0}")]
    Decode(String),
}

/// Identifier the host assigned to an enrollment record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub String);

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ExternalId> for String {
    fn from(id: ExternalId) -> Self {
        id.0
    }
}

/// Status of a host enrollment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Finished,
    /// Cancelled, pending payment, or anything else the host reports
    #[serde(other)]
    Other,
}

impl EnrollmentStatus {
    /// Whether the record already grants the user access to the course
    pub fn is_active(self) -> bool {
        matches!(
            self,
            EnrollmentStatus::Enrolled | EnrollmentStatus::Completed | EnrollmentStatus::Finished
        )
    }
}

/// A row of the host enrollment table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub id: ExternalId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ref_marker: Option<String>,
    #[serde(default)]
    pub ref_id: Option<ScheduleId>,
}

impl EnrollmentRecord {
    /// Whether this record was created for the given schedule under `marker`
    pub fn created_by(&self, marker: &str, schedule_id: ScheduleId) -> bool {
        self.ref_marker.as_deref() == Some(marker) && self.ref_id == Some(schedule_id)
    }
}

/// Adapter for the host LMS enrollment store
#[async_trait]
pub trait EnrollmentAdapter: Clone + Send + Sync + 'static {
    /// Create an enrollment tagged with `(ref_marker, ref_id)`
    async fn create_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
        start_time: DateTime<Utc>,
        ref_marker: &str,
        ref_id: ScheduleId,
    ) -> Result<ExternalId, EnrollmentError>;

    /// Delete every enrollment tagged with `(ref_marker, ref_id)`; returns
    /// how many were removed
    async fn delete_enrollment_by_ref(
        &self,
        ref_marker: &str,
        ref_id: ScheduleId,
    ) -> Result<usize, EnrollmentError>;

    /// Look up the enrollment for a user/course pair, whoever created it
    async fn find_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<EnrollmentRecord>, EnrollmentError>;
}
