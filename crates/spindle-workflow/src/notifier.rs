// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Queue-level and stage-failure notifications (§4.2.5, §4.2.4).
//!
//! Grounded on `NotifyAdapter` (`crates/adapters/src/notify/mod.rs`): a
//! `Clone + Send + Sync + 'static` `#[async_trait]` trait with a no-op
//! implementation in scope and concrete publishers (desktop, webhook) out
//! of scope per `spec.md` §1.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifier, NotifierCall};

/// Errors a [`Notifier`] publisher can report. Per §7's propagation
/// policy, the manager logs these and continues — it never lets a
/// notification failure abort a lane.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notify failed: {0}")]
    Failed(String),
}

/// Publisher for the manager's two notification kinds: queue-level
/// start/completion (§4.2.5) and per-stage failure (§4.2.4).
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// The foreground lane's first transition-to-processing after the
    /// queue goes from idle to active. `count` is every non-terminal item
    /// at that moment.
    async fn queue_started(&self, count: u64) -> Result<(), NotifyError>;

    /// Published once the active set (everything but `completed`/`failed`)
    /// drains to zero.
    async fn queue_completed(&self, processed: u64, failed: u64, duration: Duration) -> Result<(), NotifyError>;

    /// Published on a classified stage failure. `context` is
    /// `"{stage} (item #{id})"` (§4.2.4).
    async fn stage_error(&self, context: &str, message: &str) -> Result<(), NotifyError>;
}

/// Discards every notification. Used when notifications are disabled or
/// not yet configured, and as the default for a lane that suppresses
/// notifications (§4.2.1 background lane).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl NoopNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for NoopNotifier {
    async fn queue_started(&self, _count: u64) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn queue_completed(&self, _processed: u64, _failed: u64, _duration: Duration) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn stage_error(&self, _context: &str, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
