// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    negative = { -120, "available now" },
    zero = { 0, "available now" },
    one_second = { 1, "less than a minute" },
    fifty_nine_seconds = { 59, "less than a minute" },
    one_minute = { 60, "1 minute" },
    ninety_seconds = { 90, "1 minute" },
    two_minutes = { 120, "2 minutes" },
    one_hour = { 3600, "1 hour" },
    hour_and_minutes = { 3600 + 5 * 60, "1 hour, 5 minutes" },
    hours_and_minute = { 3 * 3600 + 60, "3 hours, 1 minute" },
    one_day = { 86_400, "1 day" },
    day_drops_minutes = { 86_400 + 59 * 60, "1 day" },
    two_days_three_hours = { 2 * 86_400 + 3 * 3600 + 17 * 60, "2 days, 3 hours" },
)]
fn formats(seconds: i64, expected: &str) {
    assert_eq!(format_remaining(Duration::seconds(seconds)), expected);
}

#[test]
fn sub_second_remainder_is_still_positive() {
    assert_eq!(
        format_remaining(Duration::milliseconds(250)),
        "less than a minute"
    );
}
