// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! "Time remaining" text shown to users waiting on a schedule

use chrono::Duration;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Describe how long until a schedule starts.
///
/// Coarsest unit first, zero components omitted, minutes only shown when
/// there is less than a day to go.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds();
    if remaining <= Duration::zero() {
        return "available now".to_string();
    }

    let days = total / DAY;
    let hours = (total % DAY) / HOUR;
    let minutes = (total % HOUR) / MINUTE;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 && days == 0 {
        parts.push(plural(minutes, "minute"));
    }

    if parts.is_empty() {
        return "less than a minute".to_string();
    }
    parts.join(", ")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

#[cfg(test)]
#[path = "remaining_tests.rs"]
mod tests;
