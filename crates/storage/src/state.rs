// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use chrono::{DateTime, Utc};
use esched_core::{CourseId, Operation, Schedule, ScheduleFilter, ScheduleId, UserId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

type Pair = (UserId, CourseId);

/// Schedule table built from WAL operations, with its secondary indexes
#[derive(Debug)]
pub struct MaterializedState {
    pub schedules: BTreeMap<ScheduleId, Schedule>,
    /// Unique-where-pending index on (user, course)
    pending_by_pair: HashMap<Pair, ScheduleId>,
    /// Due queue: pending schedules ordered by start
    pending_by_start: BTreeSet<(DateTime<Utc>, ScheduleId)>,
    /// Every schedule for a pair, any status
    by_pair: HashMap<Pair, BTreeSet<ScheduleId>>,
    next_id: u64,
}

impl Default for MaterializedState {
    fn default() -> Self {
        Self {
            schedules: BTreeMap::new(),
            pending_by_pair: HashMap::new(),
            pending_by_start: BTreeSet::new(),
            by_pair: HashMap::new(),
            next_id: 1,
        }
    }
}

impl MaterializedState {
    /// Rebuild state by applying operations in order
    pub fn from_operations<'a>(ops: impl IntoIterator<Item = &'a Operation>) -> Self {
        let mut state = Self::default();
        for op in ops {
            state.apply(op);
        }
        state
    }

    /// Id the next created schedule will receive
    pub fn next_id(&self) -> ScheduleId {
        ScheduleId(self.next_id)
    }

    pub fn get(&self, id: ScheduleId) -> Option<&Schedule> {
        self.schedules.get(&id)
    }

    /// The pending schedule for a pair, if one exists
    pub fn pending_for_pair(&self, user_id: UserId, course_id: CourseId) -> Option<&Schedule> {
        self.pending_by_pair
            .get(&(user_id, course_id))
            .and_then(|id| self.schedules.get(id))
    }

    /// Most recently created schedule for a pair, any status
    pub fn latest_for_pair(&self, user_id: UserId, course_id: CourseId) -> Option<&Schedule> {
        self.by_pair
            .get(&(user_id, course_id))
            .and_then(|ids| ids.iter().next_back())
            .and_then(|id| self.schedules.get(id))
    }

    /// Listing order: newest first
    pub fn find(&self, filter: &ScheduleFilter) -> Vec<Schedule> {
        let mut found: Vec<Schedule> = self
            .schedules
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        found
    }

    /// Due-queue order: earliest start first
    pub fn due(&self, now: DateTime<Utc>) -> Vec<Schedule> {
        self.pending_by_start
            .iter()
            .take_while(|(start, _)| *start <= now)
            .filter_map(|(_, id)| self.schedules.get(id))
            .cloned()
            .collect()
    }

    /// Single probe of the due queue
    pub fn has_due(&self, now: DateTime<Utc>) -> bool {
        self.pending_by_start
            .first()
            .is_some_and(|(start, _)| *start <= now)
    }

    /// Earliest pending start strictly after `now`
    pub fn next_activation(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.pending_by_start
            .iter()
            .map(|(start, _)| *start)
            .find(|start| *start > now)
    }

    pub fn pending_count(&self) -> usize {
        self.pending_by_start.len()
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::ScheduleCreate { schedule } => {
                self.next_id = self.next_id.max(schedule.id.0 + 1);
                self.index(schedule);
                self.schedules.insert(schedule.id, schedule.clone());
            }

            Operation::ScheduleEdit {
                id,
                scheduled_start,
                note,
                at,
            } => {
                self.modify(*id, |schedule| {
                    schedule.scheduled_start = *scheduled_start;
                    schedule.note = note.clone();
                    schedule.updated_at = *at;
                });
            }

            Operation::ScheduleTransition {
                id,
                status,
                external_ref,
                at,
            } => {
                self.modify(*id, |schedule| {
                    schedule.status = *status;
                    schedule.external_ref = external_ref.clone();
                    schedule.updated_at = *at;
                });
            }

            Operation::ScheduleDelete { id } => {
                if let Some(schedule) = self.schedules.remove(id) {
                    self.unindex(&schedule);
                }
            }
        }
    }

    /// Re-index around an in-place mutation and bump the version
    fn modify(&mut self, id: ScheduleId, change: impl FnOnce(&mut Schedule)) {
        let Some(mut schedule) = self.schedules.remove(&id) else {
            return;
        };
        self.unindex(&schedule);
        change(&mut schedule);
        schedule.version += 1;
        self.index(&schedule);
        self.schedules.insert(id, schedule);
    }

    fn index(&mut self, schedule: &Schedule) {
        self.by_pair
            .entry(schedule.pair())
            .or_default()
            .insert(schedule.id);
        if schedule.is_pending() {
            self.pending_by_pair.insert(schedule.pair(), schedule.id);
            self.pending_by_start
                .insert((schedule.scheduled_start, schedule.id));
        }
    }

    fn unindex(&mut self, schedule: &Schedule) {
        if let Some(ids) = self.by_pair.get_mut(&schedule.pair()) {
            ids.remove(&schedule.id);
            if ids.is_empty() {
                self.by_pair.remove(&schedule.pair());
            }
        }
        if self.pending_by_pair.get(&schedule.pair()) == Some(&schedule.id) {
            self.pending_by_pair.remove(&schedule.pair());
        }
        self.pending_by_start
            .remove(&(schedule.scheduled_start, schedule.id));
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
