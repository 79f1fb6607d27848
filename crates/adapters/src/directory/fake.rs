// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake directory for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DirectoryAdapter, DirectoryError};
use async_trait::async_trait;
use esched_core::{CourseId, UserId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Directory {
    users: HashSet<UserId>,
    courses: HashSet<CourseId>,
    unavailable: bool,
}

/// Directory holding only the users and courses it was told about
#[derive(Clone, Default)]
pub struct FakeDirectoryAdapter {
    inner: Arc<Mutex<Directory>>,
}

impl FakeDirectoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn directory(&self) -> std::sync::MutexGuard<'_, Directory> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_user(self, user_id: UserId) -> Self {
        self.directory().users.insert(user_id);
        self
    }

    pub fn with_course(self, course_id: CourseId) -> Self {
        self.directory().courses.insert(course_id);
        self
    }

    pub fn add_user(&self, user_id: UserId) {
        self.directory().users.insert(user_id);
    }

    pub fn add_course(&self, course_id: CourseId) {
        self.directory().courses.insert(course_id);
    }

    /// Make every lookup fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.directory().unavailable = unavailable;
    }
}

#[async_trait]
impl DirectoryAdapter for FakeDirectoryAdapter {
    async fn user_exists(&self, user_id: UserId) -> Result<bool, DirectoryError> {
        let directory = self.directory();
        if directory.unavailable {
            return Err(DirectoryError::Unavailable("injected failure".into()));
        }
        Ok(directory.users.contains(&user_id))
    }

    async fn course_exists(&self, course_id: CourseId) -> Result<bool, DirectoryError> {
        let directory = self.directory();
        if directory.unavailable {
            return Err(DirectoryError::Unavailable("injected failure".into()));
        }
        Ok(directory.courses.contains(&course_id))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
