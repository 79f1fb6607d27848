// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer and opportunistic triggers for due-schedule activation

use crate::error::EngineError;
use crate::lifecycle::Lifecycle;
use esched_adapters::{DirectoryAdapter, EnrollmentAdapter};
use esched_core::Clock;
use esched_storage::ScheduleStore;
use std::sync::Arc;

/// Runs `activate_due` at the current clock time
pub struct Trigger<S, E, D, C> {
    lifecycle: Arc<Lifecycle<S, E, D, C>>,
}

impl<S, E, D, C> Clone for Trigger<S, E, D, C> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl<S, E, D, C> Trigger<S, E, D, C>
where
    S: ScheduleStore,
    E: EnrollmentAdapter,
    D: DirectoryAdapter,
    C: Clock,
{
    pub fn new(lifecycle: Arc<Lifecycle<S, E, D, C>>) -> Self {
        Self { lifecycle }
    }

    /// Periodic timer path
    pub async fn tick(&self) -> Result<usize, EngineError> {
        let now = self.lifecycle.clock().now();
        self.lifecycle.activate_due(now).await
    }

    /// Per-request path; a single due-queue probe when nothing is due
    pub async fn on_request(&self) -> Result<usize, EngineError> {
        let now = self.lifecycle.clock().now();
        if !self.lifecycle.store().has_due(now)? {
            return Ok(0);
        }
        tracing::debug!("due schedules found on request");
        self.lifecycle.activate_due(now).await
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
