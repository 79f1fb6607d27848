// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the host LMS: its enrollment store and its user/course directory

pub mod directory;
pub mod enrollment;
pub mod host;
pub mod traced;

pub use directory::{DirectoryAdapter, DirectoryError};
pub use enrollment::{
    EnrollmentAdapter, EnrollmentError, EnrollmentRecord, EnrollmentStatus, ExternalId,
};
pub use host::HttpHostAdapter;
pub use traced::{TracedDirectoryAdapter, TracedEnrollmentAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use directory::FakeDirectoryAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use enrollment::{EnrollmentCall, FakeEnrollmentAdapter};
