// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the lifecycle engine

use esched_adapters::{DirectoryError, EnrollmentError};
use esched_core::{CourseId, ScheduleId, ScheduleStatus, UserId};
use esched_storage::{StoreError, WalError};
use thiserror::Error;

/// Errors surfaced by engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("user {user_id} already has a pending schedule for course {course_id} (schedule {existing})")]
    AlreadyScheduled {
        user_id: UserId,
        course_id: CourseId,
        existing: ScheduleId,
    },
    #[error("user {user_id} is already enrolled in course {course_id} ({external_ref})")]
    AlreadyEnrolled {
        user_id: UserId,
        course_id: CourseId,
        external_ref: String,
    },
    #[error("schedule not found: {0}")]
    NotFound(ScheduleId),
    #[error("schedule {id} is {status}, not pending")]
    NotPending {
        id: ScheduleId,
        status: ScheduleStatus,
    },
    #[error("external enrollment store error: {0}")]
    ExternalStore(String),
    #[error("schedule {0} was modified concurrently, please retry")]
    ConcurrencyConflict(ScheduleId),
    #[error("storage error: {0}")]
    Store(#[source] WalError),
}

impl EngineError {
    /// Stable machine-readable name, used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation",
            EngineError::AlreadyScheduled { .. } => "already_scheduled",
            EngineError::AlreadyEnrolled { .. } => "already_enrolled",
            EngineError::NotFound(_) => "not_found",
            EngineError::NotPending { .. } => "not_pending",
            EngineError::ExternalStore(_) => "external_store",
            EngineError::ConcurrencyConflict(_) => "concurrency_conflict",
            EngineError::Store(_) => "store",
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => EngineError::NotFound(id),
            StoreError::AlreadyScheduled {
                user_id,
                course_id,
                existing,
            } => EngineError::AlreadyScheduled {
                user_id,
                course_id,
                existing,
            },
            StoreError::Validation(msg) => EngineError::Validation(msg),
            StoreError::Conflict { id, .. } => EngineError::ConcurrencyConflict(id),
            StoreError::Wal(e) => EngineError::Store(e),
        }
    }
}

impl From<EnrollmentError> for EngineError {
    fn from(e: EnrollmentError) -> Self {
        EngineError::ExternalStore(e.to_string())
    }
}

impl From<DirectoryError> for EngineError {
    fn from(e: DirectoryError) -> Self {
        EngineError::ExternalStore(e.to_string())
    }
}
