// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::sync::Arc;
use yare::parameterized;

#[test]
fn system_clock_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.now_ms() > 1_577_836_800_000);
}

#[test]
fn manual_clock_moves_only_when_told() {
    let clock = ManualClock::new(1_000);
    assert_eq!(clock.now_ms(), 1_000);

    clock.advance(Duration::from_millis(250));
    assert_eq!(clock.now_ms(), 1_250);

    clock.set(500);
    assert_eq!(clock.now_ms(), 500);
}

#[test]
fn shared_clock_reads_through_arc() {
    let clock = Arc::new(ManualClock::new(42));
    let dynamic: Arc<dyn ClockSource> = clock.clone();
    clock.advance(Duration::from_millis(8));
    assert_eq!(dynamic.now_ms(), 50);
}

#[parameterized(
    zero = { 100, Duration::ZERO, 100 },
    millis = { 100, Duration::from_millis(200), 300 },
    huge = { 100, Duration::MAX, u64::MAX },
)]
fn deadline_arithmetic(now: u64, timeout: Duration, expected: u64) {
    assert_eq!(deadline_after(now, timeout), expected);
}

#[parameterized(
    zero = { Duration::ZERO, 0 },
    millis = { Duration::from_millis(1_500), 1_500 },
    saturates = { Duration::MAX, u64::MAX },
)]
fn duration_ms_saturates(d: Duration, expected: u64) {
    assert_eq!(duration_ms(d), expected);
}
