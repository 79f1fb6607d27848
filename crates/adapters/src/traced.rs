// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::directory::{DirectoryAdapter, DirectoryError};
use crate::enrollment::{EnrollmentAdapter, EnrollmentError, EnrollmentRecord, ExternalId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use esched_core::{CourseId, ScheduleId, UserId};
use tracing::Instrument;

/// Wrapper that adds tracing to any EnrollmentAdapter
#[derive(Clone)]
pub struct TracedEnrollmentAdapter<E> {
    inner: E,
}

impl<E> TracedEnrollmentAdapter<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

/// An empty marker would make reference deletes match untagged records
fn check_marker(ref_marker: &str) -> Result<(), EnrollmentError> {
    if ref_marker.trim().is_empty() {
        tracing::error!("empty reference marker");
        return Err(EnrollmentError::Rejected(
            "reference marker must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl<E: EnrollmentAdapter> EnrollmentAdapter for TracedEnrollmentAdapter<E> {
    async fn create_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
        start_time: DateTime<Utc>,
        ref_marker: &str,
        ref_id: ScheduleId,
    ) -> Result<ExternalId, EnrollmentError> {
        let span = tracing::info_span!(
            "enrollment.create",
            user_id = %user_id,
            course_id = %course_id,
            ref_marker,
            ref_id = %ref_id
        );
        async {
            tracing::info!(start_time = %start_time, "creating enrollment");
            if let Err(e) = check_marker(ref_marker) {
                return Err(e);
            }

            let start = std::time::Instant::now();
            let result = self
                .inner
                .create_enrollment(user_id, course_id, start_time, ref_marker, ref_id)
                .await;
            let elapsed = start.elapsed();

            match &result {
                Ok(id) => tracing::info!(
                    external_id = %id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "enrollment created"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "create failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete_enrollment_by_ref(
        &self,
        ref_marker: &str,
        ref_id: ScheduleId,
    ) -> Result<usize, EnrollmentError> {
        let span = tracing::info_span!("enrollment.delete_by_ref", ref_marker, ref_id = %ref_id);
        async {
            if let Err(e) = check_marker(ref_marker) {
                return Err(e);
            }

            let start = std::time::Instant::now();
            let result = self.inner.delete_enrollment_by_ref(ref_marker, ref_id).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(deleted) => tracing::info!(
                    deleted,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "enrollment removed"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "delete failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn find_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<EnrollmentRecord>, EnrollmentError> {
        let result = self.inner.find_enrollment(user_id, course_id).await;
        match &result {
            Ok(record) => tracing::debug!(
                user_id = %user_id,
                course_id = %course_id,
                found = ?record.as_ref().map(|r| (&r.id, r.status)),
                "looked up enrollment"
            ),
            Err(e) => tracing::warn!(
                user_id = %user_id,
                course_id = %course_id,
                error = %e,
                "enrollment lookup failed"
            ),
        }
        result
    }
}

/// Wrapper that adds tracing to any DirectoryAdapter
#[derive(Clone)]
pub struct TracedDirectoryAdapter<D> {
    inner: D,
}

impl<D> TracedDirectoryAdapter<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: DirectoryAdapter> DirectoryAdapter for TracedDirectoryAdapter<D> {
    async fn user_exists(&self, user_id: UserId) -> Result<bool, DirectoryError> {
        let result = self.inner.user_exists(user_id).await;
        match &result {
            Ok(exists) => tracing::trace!(user_id = %user_id, exists, "checked user"),
            Err(e) => tracing::warn!(user_id = %user_id, error = %e, "user lookup failed"),
        }
        result
    }

    async fn course_exists(&self, course_id: CourseId) -> Result<bool, DirectoryError> {
        let result = self.inner.course_exists(course_id).await;
        match &result {
            Ok(exists) => tracing::trace!(course_id = %course_id, exists, "checked course"),
            Err(e) => tracing::warn!(course_id = %course_id, error = %e, "course lookup failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
