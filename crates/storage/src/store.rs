// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule store: the only write path to schedule data

use crate::state::MaterializedState;
use crate::wal::{Wal, WalError};
use chrono::{DateTime, Utc};
use esched_core::{
    CourseId, NewSchedule, Operation, Schedule, ScheduleFilter, ScheduleId, ScheduleStatus,
    UserId,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

/// Longest note accepted on a schedule
pub const MAX_NOTE_LEN: usize = 1000;

/// Errors from schedule storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("schedule not found: {0}")]
    NotFound(ScheduleId),
    #[error("user {user_id} already has a pending schedule for course {course_id} (schedule {existing})")]
    AlreadyScheduled {
        user_id: UserId,
        course_id: CourseId,
        existing: ScheduleId,
    },
    #[error("invalid schedule: {0}")]
    Validation(String),
    #[error("schedule {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        id: ScheduleId,
        expected: u64,
        actual: u64,
    },
    #[error("storage error: {0}")]
    Wal(#[from] WalError),
}

/// Administrative edit; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    #[serde(default)]
    pub scheduled_start: Option<DateTime<Utc>>,
    /// `Some(None)` clears the note
    #[serde(default)]
    pub note: Option<Option<String>>,
    /// When set, the edit only applies if the row still has this version
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Counters for the scheduler status view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStats {
    pub pending: usize,
    pub activated: usize,
    /// Pending schedules whose start has passed
    pub due: usize,
    pub next_activation: Option<DateTime<Utc>>,
}

/// Durable CRUD and querying over schedules
pub trait ScheduleStore: Send + Sync + 'static {
    /// Insert a pending schedule; at most one pending per (user, course)
    fn create(&self, new: NewSchedule, now: DateTime<Utc>) -> Result<Schedule, StoreError>;

    /// Edit start time and/or note; always stamps `updated_at`
    fn update(
        &self,
        id: ScheduleId,
        update: ScheduleUpdate,
        now: DateTime<Utc>,
    ) -> Result<Schedule, StoreError>;

    /// Compare-and-swap status change; fails with `Conflict` unless the row
    /// is still at `expected_version`
    fn transition(
        &self,
        id: ScheduleId,
        expected_version: u64,
        status: ScheduleStatus,
        external_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Schedule, StoreError>;

    /// Hard delete; returns the removed row
    fn delete(&self, id: ScheduleId) -> Result<Schedule, StoreError>;

    fn get(&self, id: ScheduleId) -> Result<Schedule, StoreError>;

    /// Matching schedules, newest first
    fn find(&self, filter: &ScheduleFilter) -> Result<Vec<Schedule>, StoreError>;

    /// Pending schedules with `scheduled_start <= now`, earliest first
    fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>, StoreError>;

    /// Whether anything is due, without materializing the queue
    fn has_due(&self, now: DateTime<Utc>) -> Result<bool, StoreError>;

    /// The schedule currently governing a (user, course) pair
    fn latest_for_pair(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Schedule>, StoreError>;

    fn stats(&self, now: DateTime<Utc>) -> Result<ScheduleStats, StoreError>;
}

struct Inner {
    wal: Option<Wal>,
    state: MaterializedState,
}

impl Inner {
    /// Log first, then apply, so state never runs ahead of the log
    fn commit(&mut self, op: Operation) -> Result<(), StoreError> {
        if let Some(wal) = self.wal.as_mut() {
            wal.append(&op)?;
        }
        self.state.apply(&op);
        Ok(())
    }

    fn fetch(&self, id: ScheduleId) -> Result<Schedule, StoreError> {
        self.state.get(id).cloned().ok_or(StoreError::NotFound(id))
    }
}

/// Store backed by a write-ahead log, with the table held in memory
pub struct WalScheduleStore {
    inner: Mutex<Inner>,
}

impl WalScheduleStore {
    /// Replay the log at `path` and keep appending to it
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let (wal, ops) = Wal::open(path)?;
        let state = MaterializedState::from_operations(&ops);
        tracing::info!(
            path = %path.display(),
            operations = ops.len(),
            schedules = state.schedules.len(),
            "schedule store opened"
        );
        Ok(Self {
            inner: Mutex::new(Inner {
                wal: Some(wal),
                state,
            }),
        })
    }

    /// Non-durable store for tests and dry runs
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Inner {
                wal: None,
                state: MaterializedState::default(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn validate_note(note: Option<&str>) -> Result<(), StoreError> {
    match note {
        Some(n) if n.chars().count() > MAX_NOTE_LEN => Err(StoreError::Validation(format!(
            "note exceeds {} characters",
            MAX_NOTE_LEN
        ))),
        _ => Ok(()),
    }
}

impl ScheduleStore for WalScheduleStore {
    fn create(&self, new: NewSchedule, now: DateTime<Utc>) -> Result<Schedule, StoreError> {
        if new.user_id.0 == 0 {
            return Err(StoreError::Validation("user id must be non-zero".into()));
        }
        if new.course_id.0 == 0 {
            return Err(StoreError::Validation("course id must be non-zero".into()));
        }
        validate_note(new.note.as_deref())?;

        let mut inner = self.lock();
        if let Some(existing) = inner.state.pending_for_pair(new.user_id, new.course_id) {
            return Err(StoreError::AlreadyScheduled {
                user_id: new.user_id,
                course_id: new.course_id,
                existing: existing.id,
            });
        }

        let schedule = Schedule {
            id: inner.state.next_id(),
            user_id: new.user_id,
            course_id: new.course_id,
            scheduled_start: new.scheduled_start,
            status: ScheduleStatus::Pending,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
            note: new.note,
            external_ref: None,
            version: 1,
        };
        inner.commit(Operation::ScheduleCreate {
            schedule: schedule.clone(),
        })?;
        Ok(schedule)
    }

    fn update(
        &self,
        id: ScheduleId,
        update: ScheduleUpdate,
        now: DateTime<Utc>,
    ) -> Result<Schedule, StoreError> {
        let mut inner = self.lock();
        let current = inner.fetch(id)?;

        if let Some(expected) = update.expected_version {
            if expected != current.version {
                return Err(StoreError::Conflict {
                    id,
                    expected,
                    actual: current.version,
                });
            }
        }

        let note = update.note.unwrap_or(current.note);
        validate_note(note.as_deref())?;

        inner.commit(Operation::ScheduleEdit {
            id,
            scheduled_start: update.scheduled_start.unwrap_or(current.scheduled_start),
            note,
            at: now,
        })?;
        inner.fetch(id)
    }

    fn transition(
        &self,
        id: ScheduleId,
        expected_version: u64,
        status: ScheduleStatus,
        external_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Schedule, StoreError> {
        let mut inner = self.lock();
        let current = inner.fetch(id)?;

        if current.version != expected_version {
            return Err(StoreError::Conflict {
                id,
                expected: expected_version,
                actual: current.version,
            });
        }

        if status == ScheduleStatus::Pending && !current.is_pending() {
            if let Some(other) = inner
                .state
                .pending_for_pair(current.user_id, current.course_id)
            {
                return Err(StoreError::AlreadyScheduled {
                    user_id: current.user_id,
                    course_id: current.course_id,
                    existing: other.id,
                });
            }
        }

        inner.commit(Operation::ScheduleTransition {
            id,
            status,
            external_ref,
            at: now,
        })?;
        inner.fetch(id)
    }

    fn delete(&self, id: ScheduleId) -> Result<Schedule, StoreError> {
        let mut inner = self.lock();
        let removed = inner.fetch(id)?;
        inner.commit(Operation::ScheduleDelete { id })?;
        Ok(removed)
    }

    fn get(&self, id: ScheduleId) -> Result<Schedule, StoreError> {
        self.lock().fetch(id)
    }

    fn find(&self, filter: &ScheduleFilter) -> Result<Vec<Schedule>, StoreError> {
        Ok(self.lock().state.find(filter))
    }

    fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>, StoreError> {
        Ok(self.lock().state.due(now))
    }

    fn has_due(&self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        Ok(self.lock().state.has_due(now))
    }

    fn latest_for_pair(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<Schedule>, StoreError> {
        Ok(self
            .lock()
            .state
            .latest_for_pair(user_id, course_id)
            .cloned())
    }

    fn stats(&self, now: DateTime<Utc>) -> Result<ScheduleStats, StoreError> {
        let inner = self.lock();
        let pending = inner.state.pending_count();
        Ok(ScheduleStats {
            pending,
            activated: inner.state.schedules.len() - pending,
            due: inner.state.due(now).len(),
            next_activation: inner.state.next_activation(now),
        })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
