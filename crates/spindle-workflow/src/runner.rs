// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! The lane runner loop (§4.2.2, §4.2.3): poll for ready work, reclaim
//! stale processing items on this lane's behalf, and drive a single item
//! through its stage handler with a heartbeat running alongside.

use crate::handler::StageError;
use crate::heartbeat::spawn_heartbeat;
use crate::lane::Lane;
use crate::manager::WorkflowManager;
use crate::stage::Stage;
use spindle_core::{Clock, Item};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Run one lane to completion (i.e. until `cancel` fires). Never returns
/// early on a store error — it logs and keeps polling, since a transient
/// SQLite busy error must not kill the lane (§7 classification: store
/// errors surfaced to a runner are logged, not fatal).
pub(crate) async fn run_lane<C: Clock + 'static>(manager: Arc<WorkflowManager<C>>, lane: Lane, cancel: CancellationToken) {
    let poll_interval = manager.config().poll_interval;
    let heartbeat_timeout = manager.config().heartbeat_timeout;

    loop {
        if cancel.is_cancelled() {
            return;
        }

        for status in &lane.processing_statuses {
            if let Err(err) = manager.store().reclaim_stale_processing(*status, heartbeat_timeout) {
                tracing::warn!(lane = lane.name, status = %status, error = %err, "stale reclaim failed");
            }
        }

        let next = manager.store().next_for_statuses(&lane.start_statuses);
        let item = match next {
            Ok(Some(item)) => item,
            Ok(None) => {
                tokio::select! {
                    _ = tokio::time::sleep(poll_interval) => {}
                    _ = cancel.cancelled() => return,
                }
                continue;
            }
            Err(err) => {
                tracing::warn!(lane = lane.name, error = %err, "poll for ready item failed");
                tokio::select! {
                    _ = tokio::time::sleep(poll_interval) => {}
                    _ = cancel.cancelled() => return,
                }
                continue;
            }
        };

        let Some(stage) = lane.stage_for_status(item.status).cloned() else {
            // Item advanced (or was reassigned) between poll and dispatch;
            // another lane iteration will pick it up correctly.
            continue;
        };

        process_item(&manager, &lane, &stage, item, cancel.child_token()).await;
    }
}

/// Drive a single item through `stage` (§4.2.3, steps 1-8).
async fn process_item<C: Clock + 'static>(
    manager: &Arc<WorkflowManager<C>>,
    lane: &Lane,
    stage: &Stage,
    mut item: Item,
    cancel: CancellationToken,
) {
    // Step 1: a fresh request id correlates every log line this invocation
    // produces, alongside the lane and stage it ran on.
    let request_id = manager.id_gen().next();
    let span = tracing::info_span!(
        "process_item",
        lane = lane.name,
        stage = stage.name,
        item_id = item.id,
        request_id = %request_id,
    );
    let _enter = span.clone().entered();

    // Step 2: claim the item.
    item.status = stage.processing;
    item.progress_percent = 0.0;
    item.progress_stage = String::new();
    item.progress_message = String::new();
    item.error_message = String::new();
    item.last_heartbeat = None;

    let Ok(claimed) = manager.store().update(&item) else {
        tracing::warn!(item_id = item.id, "failed to persist claim, abandoning this cycle");
        return;
    };
    item = claimed;
    manager.record_item(&item);

    if lane.notify {
        manager.maybe_start_queue().await;
    }

    // Step 3: prepare.
    if let Err(err) = stage.handler.prepare(&mut item).await {
        classify_and_record_failure(manager, stage, &mut item, StageError::Classified(err)).await;
        return;
    }
    let Ok(prepared) = manager.store().update(&item) else {
        tracing::warn!(item_id = item.id, "failed to persist prepared state");
        return;
    };
    item = prepared;

    // Step 4-5: heartbeat runs alongside execute, cancellable independently.
    let heartbeat_cancel = cancel.child_token();
    let heartbeat_handle = spawn_heartbeat(manager.store_arc(), item.id, manager.config().heartbeat_interval, heartbeat_cancel.clone());

    let outcome = stage.handler.execute(&mut item, cancel.clone()).await;

    heartbeat_cancel.cancel();
    let _ = heartbeat_handle.await;

    match outcome {
        Ok(()) => {
            if item.status == stage.processing {
                item.status = stage.done;
            }
            item.last_heartbeat = None;
            if stage.done == spindle_core::Status::Completed {
                item.progress_percent = 100.0;
                if item.progress_stage.is_empty() {
                    item.progress_stage = "completed".to_string();
                }
            }
            item.clamp_progress();

            if manager.store().update(&item).is_ok() {
                manager.record_item(&item);
            }
            manager.maybe_complete_queue().await;
        }
        Err(StageError::Cancelled) => {
            // Shutdown in progress (§7 Scenario 5): leave the item exactly
            // where the handler left it. The reclaimer will roll it back
            // once its heartbeat goes stale, on the next run.
        }
        Err(classified @ StageError::Classified(_)) => {
            classify_and_record_failure(manager, stage, &mut item, classified).await;
        }
    }
}

async fn classify_and_record_failure<C: Clock + 'static>(
    manager: &Arc<WorkflowManager<C>>,
    stage: &Stage,
    item: &mut Item,
    err: StageError,
) {
    let StageError::Classified(classified) = err else {
        return;
    };

    item.status = spindle_core::Status::Failed;
    item.error_message = classified.message.clone();
    if classified.hint.is_some() {
        item.review_reason = classified.hint.clone();
    }
    item.progress_message = classified.hint.clone().unwrap_or_else(|| classified.message.clone());
    item.progress_stage = "Failed".to_string();
    item.progress_percent = 0.0;
    item.last_heartbeat = None;
    item.clamp_progress();

    if manager.store().update(item).is_ok() {
        manager.record_item(item);
    }
    manager.record_error(classified.message.clone());

    let context = format!("{} (item #{})", stage.name, item.id);
    if let Err(err) = manager.notifier().stage_error(&context, &classified.message).await {
        tracing::warn!(item_id = item.id, error = %err, "stage_error notification failed");
    }

    manager.maybe_complete_queue().await;
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
