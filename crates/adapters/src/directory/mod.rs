// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host user/course directory adapter

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDirectoryAdapter;

use async_trait::async_trait;
use esched_core::{CourseId, UserId};
use thiserror::Error;

/// Errors from directory lookups
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Existence checks against the host's users and courses
#[async_trait]
pub trait DirectoryAdapter: Clone + Send + Sync + 'static {
    async fn user_exists(&self, user_id: UserId) -> Result<bool, DirectoryError>;

    async fn course_exists(&self, course_id: CourseId) -> Result<bool, DirectoryError>;
}
