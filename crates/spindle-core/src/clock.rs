// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Clock abstraction for testable time handling.
//!
//! The store persists `DateTime<Utc>` columns; the manager's heartbeat and
//! reclaim-cutoff arithmetic needs a monotonic clock it can fast-forward in
//! tests without real sleeps. `Clock` provides both views from one source.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A clock that provides the current time.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for heartbeat intervals and cutoffs.
    fn now(&self) -> Instant;
    /// Wall-clock time, used for persisted timestamp columns.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Real system clock.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fake clock for testing with controllable time.
///
/// `Instant` has no public constructor for an arbitrary point in time, so
/// the fake clock anchors a real `Instant` at construction and only ever
/// advances it — tests reason about elapsed durations, never absolute
/// instants.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

struct FakeClockState {
    monotonic: Instant,
    utc: DateTime<Utc>,
}

impl FakeClock {
    /// Create a fake clock anchored at the real current time.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                monotonic: Instant::now(),
                utc: Utc::now(),
            })),
        }
    }

    /// Advance both the monotonic and wall-clock views by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.inner.lock();
        state.monotonic += duration;
        state.utc += chrono::Duration::from_std(duration).unwrap_or_default();
    }

    /// Pin the wall-clock view to a specific instant (monotonic view is untouched).
    pub fn set_utc(&self, utc: DateTime<Utc>) {
        self.inner.lock().utc = utc;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().monotonic
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.inner.lock().utc
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
