// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Exponential backoff around `SQLITE_BUSY`/`SQLITE_LOCKED` (§4.1).
//!
//! `PRAGMA busy_timeout` already makes SQLite itself wait out a lock before
//! failing; this retry loop is the belt-and-suspenders application-level
//! policy the spec calls out separately: up to 5 attempts, starting at
//! 10ms and doubling each time, capped at 200ms.

use crate::error::StoreError;
use std::thread;
use std::time::Duration;

const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(200);
const MAX_ATTEMPTS: u32 = 5;

/// Run `op`, retrying on busy/locked sqlite errors with exponential backoff.
/// Any other error, or a busy error on the final attempt, is returned as-is.
pub(crate) fn with_busy_retry<T>(
    mut op: impl FnMut() -> Result<T, rusqlite::Error>,
) -> Result<T, StoreError> {
    let mut backoff = INITIAL_BACKOFF;

    for attempt in 1..=MAX_ATTEMPTS {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if StoreError::is_retryable(&err) && attempt < MAX_ATTEMPTS => {
                tracing::debug!(attempt, backoff_ms = backoff.as_millis(), "store busy, retrying");
                thread::sleep(backoff);
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
            Err(err) if StoreError::is_retryable(&err) => {
                return Err(StoreError::Busy);
            }
            Err(err) => return Err(StoreError::from(err)),
        }
    }

    unreachable!("loop always returns by its final iteration")
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
