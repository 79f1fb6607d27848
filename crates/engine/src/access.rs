// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only access decisions for the host content gate

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use esched_core::{AccessDecision, CourseId, UserId};
use esched_storage::ScheduleStore;
use std::sync::Arc;

/// Answers "may this user see this course now?" from schedule state
///
/// Never writes. The most recently created schedule for the pair governs.
pub struct AccessService<S> {
    store: Arc<S>,
}

impl<S> Clone for AccessService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ScheduleStore> AccessService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn decide(
        &self,
        user_id: UserId,
        course_id: CourseId,
        now: DateTime<Utc>,
    ) -> Result<AccessDecision, EngineError> {
        let schedule = self.store.latest_for_pair(user_id, course_id)?;
        Ok(esched_core::decide(schedule.as_ref(), now))
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
