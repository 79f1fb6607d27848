// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp parsing and display
//!
//! All timestamps live on a single reference clock (UTC). Naive inputs such
//! as `2025-01-01 09:00` are read on that clock.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Accepted naive layouts, tried in order after RFC 3339
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed timestamp '{0}': expected RFC 3339 or YYYY-MM-DD HH:MM[:SS]")]
pub struct TimeParseError(pub String);

/// Parse a concrete timestamp
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimeParseError(input.to_string()))
}

/// Human-readable timestamp, e.g. `January 1, 2025 9:00 am`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y %-I:%M %P").to_string()
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
