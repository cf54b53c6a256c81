// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Fake stage handler for testing, grounded on `FakeAgentAdapter`
//! (`crates/adapters/src/agent/fake.rs`): a shared, lockable inner state
//! plus a recorded call log, configurable via a small builder so each test
//! can script the scenario it needs (instant success, a classified
//! failure, a delay, or an execute that only ever returns on
//! cancellation).

use crate::handler::{HealthCheck, StageError, StageHandler};
use async_trait::async_trait;
use parking_lot::Mutex;
use spindle_core::{ClassifiedError, Item};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What [`FakeStageHandler::prepare`] should do.
#[derive(Clone)]
pub enum PrepareOutcome {
    Succeed,
    Fail(ClassifiedError),
}

type MutateFn = Arc<dyn Fn(&mut Item) + Send + Sync>;

struct Inner {
    name: String,
    prepare_outcome: PrepareOutcome,
    execute_result: Result<(), StageError>,
    execute_delay: Option<Duration>,
    execute_waits_for_cancel: bool,
    mutate_on_success: Option<MutateFn>,
    health: HealthCheck,
    calls: Vec<String>,
}

/// A configurable [`StageHandler`] test double.
#[derive(Clone)]
pub struct FakeStageHandler {
    inner: Arc<Mutex<Inner>>,
}

impl FakeStageHandler {
    /// A handler whose `prepare` and `execute` both succeed immediately.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            inner: Arc::new(Mutex::new(Inner {
                health: HealthCheck::ready(name.clone(), "ok"),
                name,
                prepare_outcome: PrepareOutcome::Succeed,
                execute_result: Ok(()),
                execute_delay: None,
                execute_waits_for_cancel: false,
                mutate_on_success: None,
                calls: Vec::new(),
            })),
        }
    }

    pub fn with_prepare_failure(self, err: ClassifiedError) -> Self {
        self.inner.lock().prepare_outcome = PrepareOutcome::Fail(err);
        self
    }

    pub fn with_execute_failure(self, err: ClassifiedError) -> Self {
        self.inner.lock().execute_result = Err(StageError::Classified(err));
        self
    }

    /// `execute` sleeps for `delay` (honoring cancellation) before
    /// returning its configured result.
    pub fn with_execute_delay(self, delay: Duration) -> Self {
        self.inner.lock().execute_delay = Some(delay);
        self
    }

    /// `execute` blocks until `ctx` is cancelled, then returns
    /// [`StageError::Cancelled`] (scenario 5: shutdown cleanliness).
    pub fn await_cancellation(self) -> Self {
        self.inner.lock().execute_waits_for_cancel = true;
        self
    }

    /// Mutate the item in place when `execute` succeeds, e.g. to populate
    /// `ripped_file` the way a real ripper handler would.
    pub fn with_mutate(self, f: impl Fn(&mut Item) + Send + Sync + 'static) -> Self {
        self.inner.lock().mutate_on_success = Some(Arc::new(f));
        self
    }

    pub fn with_health(self, health: HealthCheck) -> Self {
        self.inner.lock().health = health;
        self
    }

    /// Calls recorded so far, e.g. `["prepare", "execute"]`.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl StageHandler for FakeStageHandler {
    async fn prepare(&self, item: &mut Item) -> Result<(), ClassifiedError> {
        let outcome = {
            let mut inner = self.inner.lock();
            inner.calls.push("prepare".to_string());
            inner.prepare_outcome.clone()
        };
        item.progress_stage = String::new();
        item.progress_percent = 0.0;
        item.progress_message = String::new();
        match outcome {
            PrepareOutcome::Succeed => Ok(()),
            PrepareOutcome::Fail(err) => Err(err),
        }
    }

    async fn execute(&self, item: &mut Item, ctx: CancellationToken) -> Result<(), StageError> {
        let (delay, waits_for_cancel, result, mutate) = {
            let mut inner = self.inner.lock();
            inner.calls.push("execute".to_string());
            (
                inner.execute_delay,
                inner.execute_waits_for_cancel,
                inner.execute_result.clone(),
                inner.mutate_on_success.clone(),
            )
        };

        if waits_for_cancel {
            ctx.cancelled().await;
            return Err(StageError::Cancelled);
        }

        if let Some(delay) = delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = ctx.cancelled() => return Err(StageError::Cancelled),
            }
        }

        if result.is_ok() {
            if let Some(mutate) = mutate {
                mutate(item);
            }
        }
        result
    }

    async fn health_check(&self) -> HealthCheck {
        self.inner.lock().health.clone()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
