// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Schedule lifecycle engine
//!
//! Drives schedules from `pending` to `activated`, keeps the host enrollment
//! store in step with them, and answers access questions for the content gate.

mod access;
mod error;
mod guard;
mod lifecycle;
mod trigger;

pub use access::AccessService;
pub use error::EngineError;
pub use guard::EditGuard;
pub use lifecycle::{
    BulkAction, BulkFailure, BulkOutcome, Lifecycle, LifecycleConfig, LifecycleDeps,
    RescheduleOutcome, Rescheduled,
};
pub use trigger::Trigger;
