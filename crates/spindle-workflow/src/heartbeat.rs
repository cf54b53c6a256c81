// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! The per-item heartbeat task (§4.3).
//!
//! Spawned by [`crate::runner::process_item`] for the duration of a single
//! `Execute` call, bound to one item id. Every `heartbeat_interval` it
//! stamps `last_heartbeat` so [`spindle_store::QueueStore::reclaim_stale_processing`]
//! knows the stage is still alive, and it samples the item's current
//! progress for observability — logging only when that progress actually
//! changed, not on every tick.

use spindle_core::Clock;
use spindle_store::QueueStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The last-seen progress sample, compared on every tick so the sampler
/// only logs real changes (§4.3: "the sampler suppresses repeats").
#[derive(PartialEq)]
struct Sample {
    stage: String,
    message: String,
    percent_millis: i64,
}

impl Sample {
    fn of(stage: &str, message: &str, percent: f64) -> Self {
        Self {
            stage: stage.to_string(),
            message: message.to_string(),
            // Compare progress_percent (an f64) by its millipercent integer
            // value rather than raw float equality, which is fragile
            // across repeated reads of the same stored value.
            percent_millis: (percent * 1000.0).round() as i64,
        }
    }
}

/// Spawn the heartbeat loop for `item_id`. Exits promptly once `cancel`
/// fires, either because `Execute` returned or because the daemon is
/// shutting down — both cases are indistinguishable to this task, which is
/// why it never classifies anything as a stage failure.
pub(crate) fn spawn_heartbeat<C: Clock + 'static>(
    store: Arc<QueueStore<C>>,
    item_id: i64,
    heartbeat_interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(heartbeat_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; `process_item` already stamped
        // `last_heartbeat` at claim time, so skip it to avoid a redundant
        // write before the stage has done a full interval of work.
        ticker.tick().await;

        let mut last_sample: Option<Sample> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancel.cancelled() => return,
            }

            match store.update_heartbeat(item_id) {
                Ok(()) => {}
                Err(err) if cancel.is_cancelled() => {
                    tracing::debug!(item_id, error = %err, "heartbeat update failed during shutdown");
                }
                Err(err) => {
                    tracing::warn!(item_id, error = %err, "heartbeat update failed");
                }
            }

            if let Ok(item) = store.get_by_id(item_id) {
                let sample = Sample::of(&item.progress_stage, &item.progress_message, item.progress_percent);
                if last_sample.as_ref() != Some(&sample) {
                    tracing::debug!(
                        item_id,
                        stage = %item.progress_stage,
                        message = %item.progress_message,
                        percent = item.progress_percent,
                        "progress"
                    );
                    last_sample = Some(sample);
                }
            }

            if cancel.is_cancelled() {
                return;
            }
        }
    })
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
