// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! The workflow manager: `Start`/`Stop`/`Status`/`ConfigureStages` (§4.2.6,
//! §6.3), spawning one lane runner per non-empty lane and owning the
//! cancellation tree used for graceful shutdown (§7 Scenario 5).

use crate::config::ManagerConfig;
use crate::error::WorkflowError;
use crate::handler::HealthCheck;
use crate::lane::{build_lanes, Lane};
use crate::notifier::{NoopNotifier, Notifier};
use crate::runner;
use crate::stage::StageSet;
use parking_lot::Mutex;
use spindle_core::{Clock, IdGen, Item, SystemClock, UuidIdGen};
use spindle_store::QueueStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct State {
    lanes: Vec<Lane>,
    running: bool,
    cancel: Option<CancellationToken>,
    handles: Vec<JoinHandle<()>>,
    queue_active: bool,
    queue_started_at: Option<std::time::Instant>,
    last_error: Option<String>,
    last_item: Option<Item>,
}

impl State {
    fn new() -> Self {
        Self {
            lanes: Vec::new(),
            running: false,
            cancel: None,
            handles: Vec::new(),
            queue_active: false,
            queue_started_at: None,
            last_error: None,
            last_item: None,
        }
    }
}

/// A point-in-time view of the manager's health (§6.3 `Status`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusSnapshot {
    pub running: bool,
    pub lanes: Vec<String>,
    pub stage_health: Vec<HealthCheck>,
    pub last_error: Option<String>,
    pub last_item: Option<Item>,
}

/// Shared state behind the two-lane scheduler and heartbeat/reclaimer
/// (§4.2, §4.3). Cheap to clone: an `Arc`-backed handle.
pub struct WorkflowManager<C: Clock = SystemClock> {
    store: Arc<QueueStore<C>>,
    notifier: Arc<dyn Notifier>,
    config: ManagerConfig,
    id_gen: Arc<dyn IdGen>,
    state: Mutex<State>,
}

impl<C: Clock> WorkflowManager<C> {
    /// Build a manager over `store`, publishing notifications through
    /// `notifier`. Stages are registered afterward via
    /// [`Self::configure_stages`]; the manager does nothing until `Start`.
    pub fn new(store: Arc<QueueStore<C>>, notifier: Arc<dyn Notifier>, config: ManagerConfig) -> Self {
        Self {
            store,
            notifier,
            config,
            id_gen: Arc::new(UuidIdGen),
            state: Mutex::new(State::new()),
        }
    }

    /// Convenience constructor with a [`NoopNotifier`].
    pub fn without_notifications(store: Arc<QueueStore<C>>, config: ManagerConfig) -> Self {
        Self::new(store, Arc::new(NoopNotifier::new()), config)
    }

    /// Override the request-id generator (§4.2.3 step 1), e.g. with a
    /// [`spindle_core::SequentialIdGen`] for deterministic test assertions.
    /// Defaults to [`UuidIdGen`].
    pub fn with_id_gen(mut self, id_gen: Arc<dyn IdGen>) -> Self {
        self.id_gen = id_gen;
        self
    }

    /// Register the stage handlers and derive the lane split (§6.3
    /// `ConfigureStages`). Errors [`WorkflowError::AlreadyConfigured`] if
    /// the manager has already started — stages are fixed for the life of
    /// a running manager.
    pub fn configure_stages(&self, stage_set: StageSet) -> Result<(), WorkflowError> {
        let mut state = self.state.lock();
        if state.running {
            return Err(WorkflowError::AlreadyConfigured);
        }
        state.lanes = build_lanes(&stage_set);
        Ok(())
    }

    /// Start one runner task per non-empty lane, plus nothing else — the
    /// heartbeat task for a given item is spawned by [`runner::process_item`]
    /// only while that item is actually in flight (§4.2.6 `Start`).
    pub fn start(self: &Arc<Self>) -> Result<(), WorkflowError>
    where
        C: 'static,
    {
        let mut state = self.state.lock();
        if state.running {
            return Err(WorkflowError::AlreadyRunning);
        }

        let cancel = CancellationToken::new();
        let mut handles = Vec::with_capacity(state.lanes.len());
        for lane in state.lanes.iter().cloned() {
            let manager = Arc::clone(self);
            let token = cancel.child_token();
            handles.push(tokio::spawn(async move {
                runner::run_lane(manager, lane, token).await;
            }));
        }

        state.cancel = Some(cancel);
        state.handles = handles;
        state.running = true;
        Ok(())
    }

    /// Cancel every lane and its in-flight heartbeat tasks, then wait for
    /// them to exit (§4.2.6 `Stop`, §7 Scenario 5). A no-op if not running.
    pub async fn stop(&self) {
        let (cancel, handles) = {
            let mut state = self.state.lock();
            if !state.running {
                return;
            }
            state.running = false;
            (state.cancel.take(), std::mem::take(&mut state.handles))
        };

        if let Some(cancel) = cancel {
            cancel.cancel();
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// A point-in-time health snapshot (§6.3 `Status`): whether the manager
    /// is running, the configured lanes, each stage handler's health check,
    /// and the most recently observed error/item.
    pub async fn status(&self) -> StatusSnapshot {
        let (running, lane_names, stages, last_error, last_item) = {
            let state = self.state.lock();
            let lane_names = state.lanes.iter().map(|l| l.name.to_string()).collect();
            let stages: Vec<_> = state
                .lanes
                .iter()
                .flat_map(|l| l.stages.iter().cloned())
                .collect();
            (state.running, lane_names, stages, state.last_error.clone(), state.last_item.clone())
        };

        let mut stage_health = Vec::with_capacity(stages.len());
        for stage in &stages {
            stage_health.push(stage.handler.health_check().await);
        }

        StatusSnapshot {
            running,
            lanes: lane_names,
            stage_health,
            last_error,
            last_item,
        }
    }

    pub(crate) fn store(&self) -> &QueueStore<C> {
        &self.store
    }

    pub(crate) fn store_arc(&self) -> Arc<QueueStore<C>> {
        Arc::clone(&self.store)
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub(crate) fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub(crate) fn id_gen(&self) -> &Arc<dyn IdGen> {
        &self.id_gen
    }

    pub(crate) fn record_item(&self, item: &Item) {
        self.state.lock().last_item = Some(item.clone());
    }

    pub(crate) fn record_error(&self, message: impl Into<String>) {
        self.state.lock().last_error = Some(message.into());
    }

    /// §4.2.5: the foreground lane's first transition-to-processing since
    /// the queue went idle publishes `queue_started`. Returns the active
    /// count it reported, for tests.
    pub(crate) async fn maybe_start_queue(&self) {
        let already_active = {
            let state = self.state.lock();
            state.queue_active
        };
        if already_active {
            return;
        }

        let Ok(stats) = self.store.stats() else {
            return;
        };
        let active: i64 = stats
            .by_status
            .iter()
            .filter(|(status, _)| status.is_active())
            .map(|(_, count)| count)
            .sum();

        {
            let mut state = self.state.lock();
            if state.queue_active {
                return;
            }
            state.queue_active = true;
            state.queue_started_at = Some(std::time::Instant::now());
        }

        if let Err(err) = self.notifier.queue_started(active.max(0) as u64).await {
            tracing::warn!(error = %err, "queue_started notification failed");
        }
    }

    /// §4.2.5: once the active set drains to zero, publish
    /// `queue_completed` and reset for the next run.
    pub(crate) async fn maybe_complete_queue(&self) {
        let was_active = {
            let state = self.state.lock();
            state.queue_active
        };
        if !was_active {
            return;
        }

        let Ok(stats) = self.store.stats() else {
            return;
        };
        let active: i64 = stats
            .by_status
            .iter()
            .filter(|(status, _)| status.is_active())
            .map(|(_, count)| count)
            .sum();
        if active > 0 {
            return;
        }

        let started_at = {
            let mut state = self.state.lock();
            if !state.queue_active {
                return;
            }
            state.queue_active = false;
            state.queue_started_at.take()
        };
        let duration = started_at.map(|t| t.elapsed()).unwrap_or_default();

        let completed = stats
            .by_status
            .iter()
            .find(|(s, _)| *s == spindle_core::Status::Completed)
            .map(|(_, c)| *c)
            .unwrap_or(0);
        let failed = stats
            .by_status
            .iter()
            .find(|(s, _)| *s == spindle_core::Status::Failed)
            .map(|(_, c)| *c)
            .unwrap_or(0);

        if let Err(err) = self
            .notifier
            .queue_completed(completed.max(0) as u64, failed.max(0) as u64, duration)
            .await
        {
            tracing::warn!(error = %err, "queue_completed notification failed");
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
