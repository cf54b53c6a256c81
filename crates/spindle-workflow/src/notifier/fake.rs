// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Fake notifier for testing, grounded on `FakeNotifyAdapter`
//! (`crates/adapters/src/notify/fake.rs`): records every call behind a
//! `parking_lot::Mutex` so tests can assert on what was published.

use crate::notifier::{NotifyError, Notifier};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// One recorded notification.
#[derive(Debug, Clone, PartialEq)]
pub enum NotifierCall {
    QueueStarted { count: u64 },
    QueueCompleted { processed: u64, failed: u64, duration: Duration },
    StageError { context: String, message: String },
}

struct State {
    calls: Vec<NotifierCall>,
}

/// Recording [`Notifier`] test double.
#[derive(Clone)]
pub struct FakeNotifier {
    inner: Arc<Mutex<State>>,
}

impl Default for FakeNotifier {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State { calls: Vec::new() })),
        }
    }
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.inner.lock().calls.clone()
    }

    pub fn queue_started_count(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, NotifierCall::QueueStarted { .. })).count()
    }

    pub fn queue_completed_count(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, NotifierCall::QueueCompleted { .. })).count()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn queue_started(&self, count: u64) -> Result<(), NotifyError> {
        self.inner.lock().calls.push(NotifierCall::QueueStarted { count });
        Ok(())
    }

    async fn queue_completed(&self, processed: u64, failed: u64, duration: Duration) -> Result<(), NotifyError> {
        self.inner.lock().calls.push(NotifierCall::QueueCompleted { processed, failed, duration });
        Ok(())
    }

    async fn stage_error(&self, context: &str, message: &str) -> Result<(), NotifyError> {
        self.inner.lock().calls.push(NotifierCall::StageError {
            context: context.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
