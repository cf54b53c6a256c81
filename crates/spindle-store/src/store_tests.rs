// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

use super::*;
use spindle_core::FakeClock;
use std::time::Duration as StdDuration;

fn store_with_fake_clock() -> (QueueStore<FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    let store = QueueStore::open_in_memory_with_clock(clock.clone()).unwrap();
    (store, clock)
}

#[test]
fn new_disc_rejects_empty_title() {
    let (store, _clock) = store_with_fake_clock();
    let err = store.new_disc("", "FP-1").unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn new_disc_rejects_empty_fingerprint() {
    let (store, _clock) = store_with_fake_clock();
    let err = store.new_disc("Demo Disc", "").unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn new_disc_inserts_pending_item() {
    let (store, _clock) = store_with_fake_clock();
    let item = store.new_disc("Demo Disc", "FP-1").unwrap();
    assert_eq!(item.status, Status::Pending);
    assert_eq!(item.disc_title, "Demo Disc");
    assert_eq!(item.disc_fingerprint.as_deref(), Some("FP-1"));
    assert!(item.id > 0);
}

#[test]
fn new_file_inserts_ripped_item() {
    let (store, _clock) = store_with_fake_clock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movie.mkv");
    std::fs::write(&path, b"fake media").unwrap();
    let path = path.to_str().unwrap();

    let item = store.new_file(path).unwrap();
    assert_eq!(item.status, Status::Ripped);
    assert_eq!(item.ripped_file.as_deref(), Some(path));
}

#[test]
fn new_file_rejects_missing_path() {
    let (store, _clock) = store_with_fake_clock();
    let err = store.new_file("/nonexistent/movie.mkv").unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
}

#[test]
fn new_file_rejects_directory_path() {
    let (store, _clock) = store_with_fake_clock();
    let dir = tempfile::tempdir().unwrap();
    let err = store.new_file(dir.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn get_by_id_returns_not_found_for_missing_item() {
    let (store, _clock) = store_with_fake_clock();
    let err = store.get_by_id(999).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(999)));
}

#[test]
fn find_by_fingerprint_returns_oldest_match() {
    let (store, _clock) = store_with_fake_clock();
    let first = store.new_disc("First", "SHARED").unwrap();
    store.new_disc("Second", "SHARED").unwrap();

    let found = store.find_by_fingerprint("SHARED").unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

#[test]
fn find_by_fingerprint_returns_none_when_absent() {
    let (store, _clock) = store_with_fake_clock();
    assert!(store.find_by_fingerprint("missing").unwrap().is_none());
}

#[test]
fn find_by_fingerprint_trims_whitespace() {
    let (store, _clock) = store_with_fake_clock();
    let inserted = store.new_disc("Demo", "FP-1").unwrap();

    let found = store.find_by_fingerprint("  FP-1  ").unwrap().unwrap();
    assert_eq!(found.id, inserted.id);
}

#[test]
fn update_persists_every_field_and_bumps_updated_at() {
    let (store, clock) = store_with_fake_clock();
    let mut item = store.new_disc("Demo", "FP-Demo").unwrap();
    let created_updated_at = item.updated_at;

    clock.advance(StdDuration::from_secs(1));
    item.status = Status::Identifying;
    item.progress_stage = "identify".to_string();
    let saved = store.update(&item).unwrap();

    assert_eq!(saved.status, Status::Identifying);
    assert_eq!(saved.progress_stage, "identify");
    assert!(saved.updated_at > created_updated_at);
}

#[test]
fn update_rejects_unknown_id() {
    let (store, _clock) = store_with_fake_clock();
    let mut item = store.new_disc("Demo", "FP-Demo").unwrap();
    item.id = 9999;
    let err = store.update(&item).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(9999)));
}

#[test]
fn updated_at_is_strictly_increasing_even_without_clock_advance() {
    let (store, _clock) = store_with_fake_clock();
    let item = store.new_disc("Demo", "FP-Demo").unwrap();

    store.update_progress(item.id, "a", 1.0, "").unwrap();
    let after_first = store.get_by_id(item.id).unwrap().updated_at;

    store.update_progress(item.id, "b", 2.0, "").unwrap();
    let after_second = store.get_by_id(item.id).unwrap().updated_at;

    assert!(after_second > after_first, "updated_at must strictly increase (I5)");
}

#[test]
fn update_progress_clamps_into_0_to_100() {
    let (store, _clock) = store_with_fake_clock();
    let item = store.new_disc("Demo", "FP-Demo").unwrap();

    store.update_progress(item.id, "stage", 250.0, "over").unwrap();
    assert_eq!(store.get_by_id(item.id).unwrap().progress_percent, 100.0);

    store.update_progress(item.id, "stage", -5.0, "under").unwrap();
    assert_eq!(store.get_by_id(item.id).unwrap().progress_percent, 0.0);
}

#[test]
fn update_clamps_progress_percent_into_0_to_100() {
    let (store, _clock) = store_with_fake_clock();
    let mut item = store.new_disc("Demo", "FP-Demo").unwrap();

    item.progress_percent = 250.0;
    let saved = store.update(&item).unwrap();
    assert_eq!(saved.progress_percent, 100.0);
    assert_eq!(store.get_by_id(item.id).unwrap().progress_percent, 100.0);

    item.progress_percent = -5.0;
    let saved = store.update(&item).unwrap();
    assert_eq!(saved.progress_percent, 0.0);
    assert_eq!(store.get_by_id(item.id).unwrap().progress_percent, 0.0);
}

#[test]
fn update_progress_rejects_unknown_id() {
    let (store, _clock) = store_with_fake_clock();
    let err = store.update_progress(12345, "stage", 1.0, "").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(12345)));
}

#[test]
fn update_heartbeat_stamps_current_time_without_touching_updated_at() {
    let (store, clock) = store_with_fake_clock();
    let item = store.new_disc("Demo", "FP-Demo").unwrap();
    let updated_at_before = item.updated_at;

    clock.advance(StdDuration::from_secs(5));
    store.update_heartbeat(item.id).unwrap();

    let refreshed = store.get_by_id(item.id).unwrap();
    assert!(refreshed.last_heartbeat.is_some());
    assert_eq!(refreshed.updated_at, updated_at_before);
}

#[test]
fn items_by_status_filters_and_orders_oldest_first() {
    let (store, _clock) = store_with_fake_clock();
    let a = store.new_disc("A", "FP-A").unwrap();
    let b = store.new_disc("B", "FP-B").unwrap();
    let mut c = store.new_disc("C", "FP-C").unwrap();
    c.status = Status::Failed;
    store.update(&c).unwrap();

    let pending = store.items_by_status(&[Status::Pending]).unwrap();
    assert_eq!(pending.iter().map(|i| i.id).collect::<Vec<_>>(), vec![a.id, b.id]);
}

#[test]
fn items_by_status_with_empty_list_returns_empty_without_querying() {
    let (store, _clock) = store_with_fake_clock();
    store.new_disc("A", "FP-A").unwrap();
    assert_eq!(store.items_by_status(&[]).unwrap(), Vec::new());
}

#[test]
fn list_returns_every_item() {
    let (store, _clock) = store_with_fake_clock();
    store.new_disc("A", "FP-A").unwrap();
    store.new_disc("B", "FP-B").unwrap();
    assert_eq!(store.list().unwrap().len(), 2);
}

#[test]
fn next_for_statuses_returns_oldest_matching_item() {
    let (store, _clock) = store_with_fake_clock();
    let a = store.new_disc("A", "FP-A").unwrap();
    store.new_disc("B", "FP-B").unwrap();

    let next = store.next_for_statuses(&[Status::Pending]).unwrap().unwrap();
    assert_eq!(next.id, a.id);
}

#[test]
fn next_for_statuses_short_circuits_on_empty_list() {
    let (store, _clock) = store_with_fake_clock();
    store.new_disc("A", "FP-A").unwrap();
    assert!(store.next_for_statuses(&[]).unwrap().is_none());
}

#[test]
fn reset_stuck_processing_rolls_every_lane_back() {
    let (store, _clock) = store_with_fake_clock();
    let mut identifying = store.new_disc("A", "FP-A").unwrap();
    identifying.status = Status::Identifying;
    store.update(&identifying).unwrap();

    let mut ripping = store.new_disc("B", "FP-B").unwrap();
    ripping.status = Status::Ripping;
    store.update(&ripping).unwrap();

    let changed = store.reset_stuck_processing().unwrap();
    assert_eq!(changed, 2);

    assert_eq!(store.get_by_id(identifying.id).unwrap().status, Status::Pending);
    assert_eq!(store.get_by_id(ripping.id).unwrap().status, Status::Identified);
}

#[test]
fn reclaim_stale_processing_only_reclaims_past_the_cutoff() {
    let (store, clock) = store_with_fake_clock();
    let mut item = store.new_disc("A", "FP-A").unwrap();
    item.status = Status::Ripping;
    store.update(&item).unwrap();
    store.update_heartbeat(item.id).unwrap();

    let reclaimed_too_soon = store
        .reclaim_stale_processing(Status::Ripping, StdDuration::from_secs(60))
        .unwrap();
    assert_eq!(reclaimed_too_soon, 0);

    clock.advance(StdDuration::from_secs(120));
    let reclaimed = store
        .reclaim_stale_processing(Status::Ripping, StdDuration::from_secs(60))
        .unwrap();
    assert_eq!(reclaimed, 1);
    assert_eq!(store.get_by_id(item.id).unwrap().status, Status::Identified);
}

#[test]
fn reclaim_stale_processing_reclaims_items_that_never_heartbeat() {
    let (store, clock) = store_with_fake_clock();
    let mut item = store.new_disc("A", "FP-A").unwrap();
    item.status = Status::Encoding;
    store.update(&item).unwrap();

    clock.advance(StdDuration::from_secs(120));
    let reclaimed = store
        .reclaim_stale_processing(Status::Encoding, StdDuration::from_secs(60))
        .unwrap();
    assert_eq!(reclaimed, 1);
}

#[test]
fn reclaim_stale_processing_is_a_no_op_for_non_processing_status() {
    let (store, _clock) = store_with_fake_clock();
    store.new_disc("A", "FP-A").unwrap();
    let reclaimed = store
        .reclaim_stale_processing(Status::Completed, StdDuration::from_secs(0))
        .unwrap();
    assert_eq!(reclaimed, 0);
}

#[test]
fn retry_failed_moves_failed_items_back_to_pending_and_clears_error() {
    let (store, _clock) = store_with_fake_clock();
    let mut item = store.new_disc("A", "FP-A").unwrap();
    item.status = Status::Failed;
    item.error_message = "disc read error".to_string();
    store.update(&item).unwrap();

    let retried = store.retry_failed(&[]).unwrap();
    assert_eq!(retried, 1);

    let refreshed = store.get_by_id(item.id).unwrap();
    assert_eq!(refreshed.status, Status::Pending);
    assert!(refreshed.error_message.is_empty());
}

#[test]
fn retry_failed_with_ids_only_retries_the_named_items() {
    let (store, _clock) = store_with_fake_clock();
    let mut a = store.new_disc("A", "FP-A").unwrap();
    a.status = Status::Failed;
    store.update(&a).unwrap();
    let mut b = store.new_disc("B", "FP-B").unwrap();
    b.status = Status::Failed;
    store.update(&b).unwrap();

    let retried = store.retry_failed(&[a.id]).unwrap();
    assert_eq!(retried, 1);

    assert_eq!(store.get_by_id(a.id).unwrap().status, Status::Pending);
    assert_eq!(store.get_by_id(b.id).unwrap().status, Status::Failed);
}

#[test]
fn retry_failed_on_non_failed_item_is_a_no_op() {
    let (store, _clock) = store_with_fake_clock();
    let item = store.new_disc("A", "FP-A").unwrap();
    assert_eq!(item.status, Status::Pending);

    let retried = store.retry_failed(&[item.id]).unwrap();
    assert_eq!(retried, 0, "P4: retrying a non-failed id must affect zero rows");
    assert_eq!(store.get_by_id(item.id).unwrap().status, Status::Pending);
}

#[test]
fn stats_reports_totals_by_status_and_needs_review() {
    let (store, _clock) = store_with_fake_clock();
    store.new_disc("A", "FP-A").unwrap();
    let mut flagged = store.new_disc("B", "FP-B").unwrap();
    flagged.needs_review = true;
    flagged.review_reason = Some("low confidence match".to_string());
    store.update(&flagged).unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.needs_review, 1);
    assert_eq!(
        stats.by_status.iter().find(|(s, _)| *s == Status::Pending).map(|(_, c)| *c),
        Some(2)
    );
}

#[test]
fn health_reports_schema_version_and_item_count() {
    let (store, _clock) = store_with_fake_clock();
    store.new_disc("A", "FP-A").unwrap();

    let health = store.health().unwrap();
    assert!(health.ok);
    assert_eq!(health.schema_version, SCHEMA_VERSION);
    assert_eq!(health.item_count, 1);
}

#[test]
fn remove_deletes_a_single_item() {
    let (store, _clock) = store_with_fake_clock();
    let item = store.new_disc("A", "FP-A").unwrap();
    store.remove(item.id).unwrap();
    assert!(matches!(store.get_by_id(item.id).unwrap_err(), StoreError::NotFound(_)));
}

#[test]
fn remove_rejects_unknown_id() {
    let (store, _clock) = store_with_fake_clock();
    assert!(matches!(store.remove(42).unwrap_err(), StoreError::NotFound(42)));
}

#[test]
fn clear_deletes_every_item() {
    let (store, _clock) = store_with_fake_clock();
    store.new_disc("A", "FP-A").unwrap();
    store.new_disc("B", "FP-B").unwrap();
    assert_eq!(store.clear().unwrap(), 2);
    assert_eq!(store.list().unwrap().len(), 0);
}

#[test]
fn clear_completed_only_removes_completed_items() {
    let (store, _clock) = store_with_fake_clock();
    let mut done = store.new_disc("A", "FP-A").unwrap();
    done.status = Status::Completed;
    store.update(&done).unwrap();
    store.new_disc("B", "FP-B").unwrap();

    assert_eq!(store.clear_completed().unwrap(), 1);
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn clear_failed_only_removes_failed_items() {
    let (store, _clock) = store_with_fake_clock();
    let mut failed = store.new_disc("A", "FP-A").unwrap();
    failed.status = Status::Failed;
    store.update(&failed).unwrap();
    store.new_disc("B", "FP-B").unwrap();

    assert_eq!(store.clear_failed().unwrap(), 1);
    assert_eq!(store.list().unwrap().len(), 1);
}
