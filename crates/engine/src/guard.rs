// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-edit suppression of automatic activation

use chrono::{DateTime, TimeDelta, Utc};
use esched_core::ScheduleId;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Per-schedule window after a manual edit during which the automatic
/// tick leaves the schedule alone
#[derive(Debug)]
pub struct EditGuard {
    window: TimeDelta,
    armed: Mutex<HashMap<ScheduleId, DateTime<Utc>>>,
}

impl EditGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
            armed: Mutex::new(HashMap::new()),
        }
    }

    /// Start (or restart) the window for `id` at `now`
    pub fn arm(&self, id: ScheduleId, now: DateTime<Utc>) {
        self.armed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, now);
    }

    pub fn clear(&self, id: ScheduleId) {
        self.armed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
    }

    /// Whether `id` is still inside its window; expired entries are dropped
    pub fn is_suppressed(&self, id: ScheduleId, now: DateTime<Utc>) -> bool {
        let mut armed = self.armed.lock().unwrap_or_else(|e| e.into_inner());
        armed.retain(|_, at| now.signed_duration_since(*at) < self.window);
        armed.contains_key(&id)
    }

    /// Number of schedules currently suppressed
    pub fn len(&self) -> usize {
        self.armed.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
