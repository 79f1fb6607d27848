// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn system_clock_does_not_go_backwards() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(std::time::Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 >= t1);
}

#[test]
fn fake_clock_can_be_advanced() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    let clock = FakeClock::at(start);
    clock.advance(Duration::seconds(60));
    assert_eq!(clock.now(), start + Duration::seconds(60));
}

#[test]
fn fake_clock_can_be_set() {
    let clock = FakeClock::new();
    let target = Utc.with_ymd_and_hms(2030, 6, 15, 12, 30, 0).unwrap();
    clock.set(target);
    assert_eq!(clock.now(), target);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let clock1 = FakeClock::at(start);
    let clock2 = clock1.clone();
    clock2.advance(Duration::seconds(30));
    assert_eq!(clock1.now(), start + Duration::seconds(30));
}
