// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Each error says what went wrong, why it might have happened, and how to
//! fix it.

use std::fmt;

use crate::client::ClientError;
use esched_daemon::protocol::ProtocolError;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Render any command failure, enriching daemon errors
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        match err.downcast::<ClientError>() {
            Ok(client) => Self::from(client),
            Err(other) => Self::new(format!("{other:#}")),
        }
    }

    /// Error for a daemon-side rejection, keyed on the error kind
    fn rejected(kind: &str, message: String) -> Self {
        let err = CliError::new(message);
        match kind {
            "not_found" => err
                .with_context("The schedule may have been deleted")
                .with_suggestion("List schedules: esched schedule list"),
            "already_scheduled" => err
                .with_context("A user can have only one pending schedule per course")
                .with_suggestion("Edit the existing schedule: esched schedule edit <id> --start <time>")
                .with_suggestion("Or delete it first: esched schedule delete <id>"),
            "already_enrolled" => err
                .with_context("The host LMS already grants this user the course")
                .with_suggestion("Remove the enrollment in the LMS first if a delayed start is wanted"),
            "not_pending" => err
                .with_context("Only pending schedules can be activated")
                .with_suggestion("Inspect it: esched schedule show <id>"),
            "concurrency_conflict" => err
                .with_context("The schedule changed while this command was running")
                .with_suggestion("Run the command again"),
            "external_store" => err
                .with_context("The host LMS could not be reached or refused the request")
                .with_suggestion("Check [host] base_url and that the LMS is up")
                .with_suggestion("Nothing was changed; retry once the host is reachable"),
            "store" => err
                .with_context("The daemon could not write its schedule log")
                .with_suggestion("Check disk space and permissions on the state directory"),
            _ => err,
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::DaemonNotRunning => CliError::new("Daemon is not running")
                .with_suggestion("Start it: esched daemon start"),
            ClientError::DaemonStartFailed(reason) => {
                let err = CliError::new("Failed to start eschedd").with_context(reason.clone());
                if reason.contains("host URL") {
                    err.with_suggestion("Set [host] base_url in esched.toml or export ESCHED_HOST_URL")
                } else {
                    err.with_suggestion("See the daemon log in the state directory")
                }
            }
            ClientError::DaemonStartTimeout => CliError::new("Timed out waiting for eschedd to start")
                .with_suggestion("Raise ESCHED_TIMEOUT_CONNECT_MS or check the daemon log"),
            ClientError::Protocol(ProtocolError::Timeout) => {
                CliError::new("Daemon did not answer in time")
                    .with_context("A host LMS call may be slow")
                    .with_suggestion("Raise ESCHED_TIMEOUT_IPC_MS and retry")
            }
            ClientError::Rejected { kind, message } => CliError::rejected(&kind, message),
            other => CliError::new(other.to_string()),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
