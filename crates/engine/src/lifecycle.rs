// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule lifecycle: activation, reversal and administrative edits
//!
//! A schedule moves `pending -> activated` when its start passes (or an admin
//! forces it), and back to `pending` only when an admin moves the start of an
//! activated schedule into the future. Every status change is a
//! compare-and-swap on the schedule version, so overlapping ticks cannot both
//! claim the same schedule.

use crate::error::EngineError;
use crate::guard::EditGuard;
use chrono::{DateTime, Utc};
use esched_adapters::{DirectoryAdapter, EnrollmentAdapter};
use esched_core::{Clock, NewSchedule, Schedule, ScheduleFilter, ScheduleId, ScheduleStatus};
use esched_storage::{ScheduleStats, ScheduleStore, ScheduleUpdate, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Engine settings
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Tag written on every host enrollment this engine creates
    pub ref_marker: String,
    /// How long automatic activation leaves a schedule alone after an edit
    pub edit_suppression: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            ref_marker: "esched".to_string(),
            edit_suppression: Duration::from_secs(30),
        }
    }
}

/// Engine collaborators
pub struct LifecycleDeps<S, E, D> {
    pub store: Arc<S>,
    pub enrollments: E,
    pub directory: D,
}

/// What a reschedule did to the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescheduleOutcome {
    /// Was activated; host enrollment removed and status back to pending
    Reverted,
    /// Pending with a start at or before now; the first tick after the
    /// suppression window activates it
    ActivatesOnNextTick,
    /// Pending with a future start
    ActivatesAtStart,
    /// Already activated and the new start is not in the future
    Updated,
}

impl RescheduleOutcome {
    pub fn message(self) -> &'static str {
        match self {
            RescheduleOutcome::Reverted => {
                "Schedule updated; course moved back to pending (access revoked until the new start date)"
            }
            RescheduleOutcome::ActivatesOnNextTick => {
                "Schedule updated; course will be activated by the scheduler shortly"
            }
            RescheduleOutcome::ActivatesAtStart => {
                "Schedule updated; course will activate on the new start date"
            }
            RescheduleOutcome::Updated => "Schedule updated",
        }
    }
}

/// Result of a reschedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rescheduled {
    pub schedule: Schedule,
    pub outcome: RescheduleOutcome,
}

/// Bulk administrative action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Activate,
    Delete,
}

/// One failed id in a bulk action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub id: ScheduleId,
    pub message: String,
}

/// Success count plus itemized failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub action: BulkAction,
    pub processed: usize,
    pub errors: Vec<BulkFailure>,
}

/// How a single activation attempt ended
enum Activation {
    Activated(Schedule),
    /// Another caller changed the schedule first
    LostRace,
}

/// The lifecycle engine
pub struct Lifecycle<S, E, D, C> {
    store: Arc<S>,
    enrollments: E,
    directory: D,
    clock: C,
    guard: EditGuard,
    config: LifecycleConfig,
}

impl<S, E, D, C> Lifecycle<S, E, D, C>
where
    S: ScheduleStore,
    E: EnrollmentAdapter,
    D: DirectoryAdapter,
    C: Clock,
{
    pub fn new(deps: LifecycleDeps<S, E, D>, clock: C, config: LifecycleConfig) -> Self {
        Self {
            store: deps.store,
            enrollments: deps.enrollments,
            directory: deps.directory,
            clock,
            guard: EditGuard::new(config.edit_suppression),
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Create a pending schedule after checking the host knows the user and
    /// course, and that the user is not already enrolled in it
    pub async fn create_schedule(&self, new: NewSchedule) -> Result<Schedule, EngineError> {
        if !self.directory.user_exists(new.user_id).await? {
            return Err(EngineError::Validation(format!(
                "user {} does not exist",
                new.user_id
            )));
        }
        if !self.directory.course_exists(new.course_id).await? {
            return Err(EngineError::Validation(format!(
                "course {} does not exist",
                new.course_id
            )));
        }

        if let Some(existing) = self
            .enrollments
            .find_enrollment(new.user_id, new.course_id)
            .await?
        {
            if existing.status.is_active() {
                return Err(EngineError::AlreadyEnrolled {
                    user_id: new.user_id,
                    course_id: new.course_id,
                    external_ref: existing.id.into(),
                });
            }
        }

        let schedule = self.store.create(new, self.clock.now())?;
        tracing::info!(
            schedule_id = %schedule.id,
            user_id = %schedule.user_id,
            course_id = %schedule.course_id,
            scheduled_start = %schedule.scheduled_start,
            "schedule created"
        );
        Ok(schedule)
    }

    pub fn get(&self, id: ScheduleId) -> Result<Schedule, EngineError> {
        Ok(self.store.get(id)?)
    }

    pub fn list(&self, filter: &ScheduleFilter) -> Result<Vec<Schedule>, EngineError> {
        Ok(self.store.find(filter)?)
    }

    /// Activate every due schedule; returns how many this call activated
    ///
    /// Per-schedule failures are logged and left pending for the next tick.
    pub async fn activate_due(&self, now: DateTime<Utc>) -> Result<usize, EngineError> {
        let due = self.store.find_due(now)?;
        let mut activated = 0;

        for schedule in due {
            let id = schedule.id;
            if self.guard.is_suppressed(id, now) {
                tracing::debug!(schedule_id = %id, "recently edited, skipping");
                continue;
            }

            match self.activate(schedule, now).await {
                Ok(Activation::Activated(_)) => activated += 1,
                Ok(Activation::LostRace) => {
                    tracing::debug!(schedule_id = %id, "already handled elsewhere");
                }
                Err(EngineError::NotFound(_)) => {
                    tracing::debug!(schedule_id = %id, "deleted before activation");
                }
                Err(e) => {
                    tracing::warn!(schedule_id = %id, error = %e, "activation failed, will retry");
                }
            }
        }

        if activated > 0 {
            tracing::info!(activated, "activated due schedules");
        }
        Ok(activated)
    }

    /// Activate a pending schedule right away, ignoring its start time
    pub async fn activate_now(&self, id: ScheduleId) -> Result<Schedule, EngineError> {
        let schedule = self.store.get(id)?;
        if !schedule.is_pending() {
            return Err(EngineError::NotPending {
                id,
                status: schedule.status,
            });
        }

        match self.activate(schedule, self.clock.now()).await? {
            Activation::Activated(schedule) => Ok(schedule),
            Activation::LostRace => Err(EngineError::ConcurrencyConflict(id)),
        }
    }

    /// Claim, reconcile with the host, and record the external reference
    async fn activate(
        &self,
        schedule: Schedule,
        now: DateTime<Utc>,
    ) -> Result<Activation, EngineError> {
        let id = schedule.id;
        let claimed = match self.store.transition(
            id,
            schedule.version,
            ScheduleStatus::Activated,
            None,
            now,
        ) {
            Ok(claimed) => claimed,
            Err(StoreError::Conflict { .. }) => return Ok(Activation::LostRace),
            Err(e) => return Err(e.into()),
        };

        let external_ref = match self.reconcile(&claimed).await {
            Ok(external_ref) => external_ref,
            Err(e) => {
                self.release(&claimed, now);
                return Err(e);
            }
        };

        let Some(external_ref) = external_ref else {
            tracing::info!(schedule_id = %id, "schedule activated");
            return Ok(Activation::Activated(claimed));
        };

        self.record_external_ref(claimed, external_ref, now).await
    }

    /// Store the host record id on the claimed schedule
    ///
    /// An admin edit may land while the host create is in flight. If that
    /// edit moved the schedule back to pending, the record just created is
    /// removed again so a pending schedule never has a live enrollment.
    async fn record_external_ref(
        &self,
        claimed: Schedule,
        external_ref: String,
        now: DateTime<Utc>,
    ) -> Result<Activation, EngineError> {
        let id = claimed.id;
        let mut expected = claimed.version;

        loop {
            match self.store.transition(
                id,
                expected,
                ScheduleStatus::Activated,
                Some(external_ref.clone()),
                now,
            ) {
                Ok(activated) => {
                    tracing::info!(
                        schedule_id = %id,
                        external_ref = %external_ref,
                        "schedule activated"
                    );
                    return Ok(Activation::Activated(activated));
                }
                Err(StoreError::Conflict { .. }) => {}
                Err(e) => return Err(e.into()),
            }

            let current = self.store.get(id)?;
            match (current.status, current.external_ref.is_some()) {
                // Edited without leaving activated; retry on the new version
                (ScheduleStatus::Activated, false) => expected = current.version,
                (ScheduleStatus::Activated, true) => {
                    tracing::debug!(schedule_id = %id, "external ref recorded elsewhere");
                    return Ok(Activation::Activated(current));
                }
                (ScheduleStatus::Pending, _) => {
                    let removed = self
                        .enrollments
                        .delete_enrollment_by_ref(&self.config.ref_marker, id)
                        .await?;
                    tracing::warn!(
                        schedule_id = %id,
                        external_ref = %external_ref,
                        removed,
                        "schedule reverted during activation, host enrollment removed"
                    );
                    return Ok(Activation::LostRace);
                }
            }
        }
    }

    /// Make sure exactly one host enrollment backs this schedule
    ///
    /// Returns the id of the record this engine owns, or `None` when the
    /// user already has access through some other enrollment.
    async fn reconcile(&self, schedule: &Schedule) -> Result<Option<String>, EngineError> {
        let marker = &self.config.ref_marker;

        if let Some(existing) = self
            .enrollments
            .find_enrollment(schedule.user_id, schedule.course_id)
            .await?
        {
            if existing.created_by(marker, schedule.id) {
                tracing::info!(
                    schedule_id = %schedule.id,
                    external_ref = %existing.id,
                    "adopting existing enrollment"
                );
                return Ok(Some(existing.id.into()));
            }
            if existing.status.is_active() {
                tracing::info!(
                    schedule_id = %schedule.id,
                    external_ref = %existing.id,
                    "user already enrolled through another path"
                );
                return Ok(None);
            }
        }

        let id = self
            .enrollments
            .create_enrollment(
                schedule.user_id,
                schedule.course_id,
                schedule.scheduled_start,
                marker,
                schedule.id,
            )
            .await?;
        Ok(Some(id.into()))
    }

    /// Undo a claim after the host side failed
    fn release(&self, claimed: &Schedule, now: DateTime<Utc>) {
        if let Err(e) = self.store.transition(
            claimed.id,
            claimed.version,
            ScheduleStatus::Pending,
            None,
            now,
        ) {
            tracing::error!(
                schedule_id = %claimed.id,
                error = %e,
                "failed to release claim; schedule left activated"
            );
        }
    }

    /// Move a schedule's start time, reversing activation when the new start
    /// is in the future
    pub async fn reschedule(
        &self,
        id: ScheduleId,
        new_start: DateTime<Utc>,
    ) -> Result<Rescheduled, EngineError> {
        let now = self.clock.now();
        let current = self.store.get(id)?;
        self.guard.arm(id, now);

        let move_start = ScheduleUpdate {
            scheduled_start: Some(new_start),
            note: None,
            expected_version: Some(current.version),
        };

        if current.status == ScheduleStatus::Activated && new_start > now {
            let pending = self.store.find(&ScheduleFilter {
                status: Some(ScheduleStatus::Pending),
                user_id: Some(current.user_id),
                course_id: Some(current.course_id),
            })?;
            if let Some(other) = pending.first() {
                return Err(EngineError::AlreadyScheduled {
                    user_id: current.user_id,
                    course_id: current.course_id,
                    existing: other.id,
                });
            }

            let removed = self
                .enrollments
                .delete_enrollment_by_ref(&self.config.ref_marker, id)
                .await?;
            let moved = self.store.update(id, move_start, now)?;
            let reverted = self.store.transition(
                id,
                moved.version,
                ScheduleStatus::Pending,
                None,
                now,
            )?;

            tracing::info!(
                schedule_id = %id,
                removed,
                scheduled_start = %new_start,
                "reverted activated schedule to pending"
            );
            return Ok(Rescheduled {
                schedule: reverted,
                outcome: RescheduleOutcome::Reverted,
            });
        }

        let moved = self.store.update(id, move_start, now)?;
        let outcome = match (moved.status, new_start <= now) {
            (ScheduleStatus::Pending, true) => RescheduleOutcome::ActivatesOnNextTick,
            (ScheduleStatus::Pending, false) => RescheduleOutcome::ActivatesAtStart,
            (ScheduleStatus::Activated, _) => RescheduleOutcome::Updated,
        };
        tracing::info!(
            schedule_id = %id,
            scheduled_start = %new_start,
            ?outcome,
            "schedule rescheduled"
        );
        Ok(Rescheduled {
            schedule: moved,
            outcome,
        })
    }

    /// Replace or clear the note
    pub fn update_note(&self, id: ScheduleId, note: Option<String>) -> Result<Schedule, EngineError> {
        let now = self.clock.now();
        self.guard.arm(id, now);
        let schedule = self.store.update(
            id,
            ScheduleUpdate {
                note: Some(note),
                ..Default::default()
            },
            now,
        )?;
        Ok(schedule)
    }

    /// Hard delete; any host enrollment is left in place
    pub fn delete_schedule(&self, id: ScheduleId) -> Result<Schedule, EngineError> {
        let removed = self.store.delete(id)?;
        self.guard.clear(id);
        tracing::info!(
            schedule_id = %id,
            status = %removed.status,
            "schedule deleted"
        );
        Ok(removed)
    }

    /// Apply an action to each id, collecting per-id failures
    pub async fn bulk(&self, action: BulkAction, ids: &[ScheduleId]) -> BulkOutcome {
        let mut outcome = BulkOutcome {
            action,
            processed: 0,
            errors: Vec::new(),
        };

        for &id in ids {
            let result = match action {
                BulkAction::Activate => self.activate_now(id).await.map(|_| ()),
                BulkAction::Delete => self.delete_schedule(id).map(|_| ()),
            };
            match result {
                Ok(()) => outcome.processed += 1,
                Err(e) => outcome.errors.push(BulkFailure {
                    id,
                    message: e.to_string(),
                }),
            }
        }

        tracing::info!(
            ?action,
            processed = outcome.processed,
            failed = outcome.errors.len(),
            "bulk action finished"
        );
        outcome
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<ScheduleStats, EngineError> {
        Ok(self.store.stats(now)?)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
