// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Errors the workflow manager itself can raise, distinct from
//! [`spindle_core::ClassifiedError`] (a handler-reported stage failure) and
//! [`spindle_store::StoreError`] (a queue store failure).

use thiserror::Error;

/// Manager-level errors: misuse of the `Start`/`Stop`/`ConfigureStages`
/// lifecycle (§4.2.6, §6.3), not stage failures.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("workflow manager is already running")]
    AlreadyRunning,

    #[error("cannot reconfigure stages after Start")]
    AlreadyConfigured,

    #[error("heartbeat_timeout ({timeout_ms}ms) must be strictly greater than heartbeat_interval ({interval_ms}ms)")]
    InvalidHeartbeatConfig { interval_ms: u64, timeout_ms: u64 },

    #[error(transparent)]
    Store(#[from] spindle_store::StoreError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
