// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Typed configuration for the workflow manager (§6 "(NEW) Configuration").
//!
//! No file-based loader lives here — config loading is out of scope per
//! `spec.md` §1 — but the struct itself is typed `Duration` fields rather
//! than a stringly-typed map, the way the embedding binary is expected to
//! assemble it.

use crate::error::WorkflowError;
use std::time::Duration;

/// Tuning knobs for [`crate::WorkflowManager`] (§4.2.2, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    /// How long a lane sleeps between polls when it finds no ready item.
    pub poll_interval: Duration,
    /// How often the heartbeat task stamps `last_heartbeat` for an
    /// in-flight item.
    pub heartbeat_interval: Duration,
    /// How stale `last_heartbeat` must be before the reclaimer rolls an
    /// item back to its trigger status. Must be strictly greater than
    /// `heartbeat_interval` (§4.3 contract; ratio ≥ 5× suggested) or a
    /// live stage risks being reclaimed from under itself.
    pub heartbeat_timeout: Duration,
}

impl ManagerConfig {
    /// Construct a config, rejecting a `heartbeat_timeout` that isn't
    /// strictly greater than `heartbeat_interval` (§4.3 contract).
    pub fn new(
        poll_interval: Duration,
        heartbeat_interval: Duration,
        heartbeat_timeout: Duration,
    ) -> Result<Self, WorkflowError> {
        if heartbeat_timeout <= heartbeat_interval {
            return Err(WorkflowError::InvalidHeartbeatConfig {
                interval_ms: heartbeat_interval.as_millis() as u64,
                timeout_ms: heartbeat_timeout.as_millis() as u64,
            });
        }
        Ok(Self {
            poll_interval,
            heartbeat_interval,
            heartbeat_timeout,
        })
    }
}

impl Default for ManagerConfig {
    /// A non-zero poll interval (§4.2.2) with a 5× heartbeat
    /// interval/timeout ratio (§4.3's suggested ratio).
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            heartbeat_interval: Duration::from_secs(5),
            heartbeat_timeout: Duration::from_secs(25),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
