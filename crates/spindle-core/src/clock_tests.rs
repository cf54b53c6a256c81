// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

use super::*;

#[test]
fn system_clock_now_advances() {
    let clock = SystemClock;
    let a = clock.now();
    std::thread::sleep(Duration::from_millis(5));
    let b = clock.now();
    assert!(b > a);
}

#[test]
fn fake_clock_advances_monotonic_and_utc_together() {
    let clock = FakeClock::new();
    let m0 = clock.now();
    let u0 = clock.now_utc();

    clock.advance(Duration::from_secs(30));

    assert_eq!(clock.now() - m0, Duration::from_secs(30));
    assert_eq!((clock.now_utc() - u0).num_seconds(), 30);
}

#[test]
fn fake_clock_is_stable_without_advance() {
    let clock = FakeClock::new();
    let a = clock.now();
    let b = clock.now();
    assert_eq!(a, b);
}

#[test]
fn fake_clock_set_utc_does_not_move_monotonic() {
    let clock = FakeClock::new();
    let m0 = clock.now();
    clock.set_utc(DateTime::from_timestamp(0, 0).unwrap());
    assert_eq!(clock.now(), m0);
    assert_eq!(clock.now_utc().timestamp(), 0);
}

#[test]
fn fake_clock_clone_shares_state() {
    let clock = FakeClock::new();
    let clone = clock.clone();
    clock.advance(Duration::from_secs(10));
    assert_eq!(clock.now_utc(), clone.now_utc());
}
