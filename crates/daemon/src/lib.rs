// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Scheduled enrollment daemon library
//!
//! Shared by `eschedd` and the `esched` CLI: configuration, the socket
//! protocol, and request dispatch onto the lifecycle engine.

pub mod config;
pub mod protocol;
pub mod service;

pub use config::{Config, ConfigError, HostConfig};
pub use protocol::{ProtocolError, Request, Response};
pub use service::Service;
