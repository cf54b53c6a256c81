// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! `QueueStore`: the durable, single-writer queue backing Spindle's
//! workflow manager (§4.1).
//!
//! One [`rusqlite::Connection`] behind a [`parking_lot::Mutex`] serializes
//! every access. WAL journaling lets concurrent readers proceed while a
//! writer holds the lock; the busy timeout plus [`with_busy_retry`] absorb
//! the remaining contention from other processes touching the same file.

use crate::error::StoreError;
use crate::retry::with_busy_retry;
use crate::row::{format_ts, item_from_row, parse_ts};
use crate::schema::ensure_schema;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use spindle_core::{Clock, Item, Status, SystemClock};
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Aggregate counts returned by [`QueueStore::stats`] (§4.1 `Stats`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total: i64,
    pub by_status: Vec<(Status, i64)>,
    pub needs_review: i64,
}

/// Result of [`QueueStore::health`] (§4.1 `Health`/`CheckHealth`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub schema_version: i64,
    pub item_count: i64,
}

/// The durable queue store. Cheap to clone: internally an `Arc`-free
/// handle guarded by a single mutex, matching the spec's single-writer
/// model rather than a connection pool.
pub struct QueueStore<C: Clock = SystemClock> {
    conn: Mutex<Connection>,
    clock: C,
}

impl QueueStore<SystemClock> {
    /// Open (or create) the queue database at `path` with the real clock.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_clock(path, SystemClock)
    }

    /// Open a private, in-memory database. Useful for tests and for
    /// processes that want Spindle's queue semantics without durability.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open_in_memory_with_clock(SystemClock)
    }
}

impl<C: Clock> QueueStore<C> {
    /// Open (or create) the queue database at `path`, using `clock` for
    /// every timestamp the store writes. Exposed so callers can inject a
    /// [`spindle_core::FakeClock`] in integration tests.
    pub fn open_with_clock(path: impl AsRef<Path>, clock: C) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::configure(&conn)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock,
        })
    }

    /// In-memory variant of [`Self::open_with_clock`].
    pub fn open_in_memory_with_clock(clock: C) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock,
        })
    }

    fn configure(conn: &Connection) -> Result<(), StoreError> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now_utc()
    }

    /// Timestamp guaranteed to be strictly greater than `id`'s current
    /// `updated_at`, satisfying invariant I5 even when two writes land
    /// within the same clock tick.
    fn next_updated_at(conn: &Connection, id: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>, StoreError> {
        let prev: Option<String> = conn
            .query_row("SELECT updated_at FROM queue_items WHERE id = ?1", [id], |r| r.get(0))
            .optional()?;

        let prev = match prev {
            Some(s) => parse_ts(&s)?,
            None => return Ok(now),
        };

        if now > prev {
            Ok(now)
        } else {
            Ok(prev + chrono::Duration::nanoseconds(1))
        }
    }

    /// Insert a new disc-ripping item (§4.1 `NewDisc`). Starts `Pending`.
    pub fn new_disc(&self, disc_title: &str, disc_fingerprint: &str) -> Result<Item, StoreError> {
        if disc_title.trim().is_empty() {
            return Err(StoreError::Validation("disc_title must not be empty".into()));
        }
        if disc_fingerprint.trim().is_empty() {
            return Err(StoreError::Validation("disc_fingerprint must not be empty".into()));
        }

        let mut item = Item::for_new_disc(disc_title.to_string(), Some(disc_fingerprint.to_string()));
        let now = self.now();
        item.created_at = now;
        item.updated_at = now;
        self.insert(item)
    }

    /// Insert an item that already has a ripped file on disk, short-circuiting
    /// straight to `Ripped` (§4.1 `NewFile`, §3 lifecycle note).
    pub fn new_file(&self, source_path: &str) -> Result<Item, StoreError> {
        if source_path.trim().is_empty() {
            return Err(StoreError::Validation("source_path must not be empty".into()));
        }
        let metadata = std::fs::metadata(source_path)?;
        if !metadata.is_file() {
            return Err(StoreError::Validation(format!(
                "source_path {source_path} is not a regular file"
            )));
        }

        let mut item = Item::for_new_file(source_path.to_string());
        let now = self.now();
        item.created_at = now;
        item.updated_at = now;
        self.insert(item)
    }

    fn insert(&self, mut item: Item) -> Result<Item, StoreError> {
        item.clamp_progress();
        let conn = self.conn.lock();
        with_busy_retry(|| {
            conn.execute(
                "INSERT INTO queue_items (
                    disc_title, disc_fingerprint, source_path, ripped_file, encoded_file, final_file,
                    status, progress_stage, progress_percent, progress_message, error_message,
                    last_heartbeat, needs_review, review_reason, created_at, updated_at,
                    media_info_json, metadata_json, rip_spec_data, encoding_details_json, active_episode_key
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21
                )",
                rusqlite::params![
                    item.disc_title,
                    item.disc_fingerprint,
                    item.source_path,
                    item.ripped_file,
                    item.encoded_file,
                    item.final_file,
                    item.status.to_string(),
                    item.progress_stage,
                    item.progress_percent,
                    item.progress_message,
                    item.error_message,
                    item.last_heartbeat.map(format_ts),
                    item.needs_review as i64,
                    item.review_reason,
                    format_ts(item.created_at),
                    format_ts(item.updated_at),
                    item.media_info_json,
                    item.metadata_json,
                    item.rip_spec_data,
                    item.encoding_details_json,
                    item.active_episode_key,
                ],
            )
        })?;

        let id = conn.last_insert_rowid();
        conn.query_row("SELECT * FROM queue_items WHERE id = ?1", [id], item_from_row)
            .map_err(StoreError::from)
    }

    /// Fetch a single item by id (§4.1 `GetByID`).
    pub fn get_by_id(&self, id: i64) -> Result<Item, StoreError> {
        let conn = self.conn.lock();
        conn.query_row("SELECT * FROM queue_items WHERE id = ?1", [id], item_from_row)
            .optional()?
            .ok_or(StoreError::NotFound(id))
    }

    /// Look up the oldest item matching a disc fingerprint, if any (§4.1
    /// `FindByFingerprint`, used for dedup on re-insert). Trims surrounding
    /// whitespace from `fingerprint` before comparing (B3).
    pub fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Item>, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT * FROM queue_items WHERE disc_fingerprint = ?1 ORDER BY id ASC LIMIT 1",
            [fingerprint.trim()],
            item_from_row,
        )
        .optional()
        .map_err(StoreError::from)
    }

    /// Replace the full row for `item.id` with its current field values,
    /// bumping `updated_at` (§4.1 `Update`).
    pub fn update(&self, item: &Item) -> Result<Item, StoreError> {
        let mut item = item.clone();
        item.clamp_progress();
        let conn = self.conn.lock();
        let now = self.now();
        let updated_at = Self::next_updated_at(&conn, item.id, now)?;

        let changed = with_busy_retry(|| {
            conn.execute(
                "UPDATE queue_items SET
                    disc_title = ?1, disc_fingerprint = ?2, source_path = ?3, ripped_file = ?4,
                    encoded_file = ?5, final_file = ?6, status = ?7, progress_stage = ?8,
                    progress_percent = ?9, progress_message = ?10, error_message = ?11,
                    last_heartbeat = ?12, needs_review = ?13, review_reason = ?14, updated_at = ?15,
                    media_info_json = ?16, metadata_json = ?17, rip_spec_data = ?18,
                    encoding_details_json = ?19, active_episode_key = ?20
                WHERE id = ?21",
                rusqlite::params![
                    item.disc_title,
                    item.disc_fingerprint,
                    item.source_path,
                    item.ripped_file,
                    item.encoded_file,
                    item.final_file,
                    item.status.to_string(),
                    item.progress_stage,
                    item.progress_percent,
                    item.progress_message,
                    item.error_message,
                    item.last_heartbeat.map(format_ts),
                    item.needs_review as i64,
                    item.review_reason,
                    format_ts(updated_at),
                    item.media_info_json,
                    item.metadata_json,
                    item.rip_spec_data,
                    item.encoding_details_json,
                    item.active_episode_key,
                    item.id,
                ],
            )
        })?;

        if changed == 0 {
            return Err(StoreError::NotFound(item.id));
        }

        conn.query_row("SELECT * FROM queue_items WHERE id = ?1", [item.id], item_from_row)
            .map_err(StoreError::from)
    }

    /// Narrow update used by stage handlers to report progress without a
    /// full read-modify-write (§4.1 `UpdateProgress`). Clamps percent into
    /// `[0, 100]` (invariant I3).
    pub fn update_progress(
        &self,
        id: i64,
        stage: &str,
        percent: f64,
        message: &str,
    ) -> Result<(), StoreError> {
        let percent = percent.clamp(0.0, 100.0);
        let conn = self.conn.lock();
        let now = self.now();
        let updated_at = Self::next_updated_at(&conn, id, now)?;

        let changed = with_busy_retry(|| {
            conn.execute(
                "UPDATE queue_items SET progress_stage = ?1, progress_percent = ?2, progress_message = ?3, updated_at = ?4 WHERE id = ?5",
                rusqlite::params![stage, percent, message, format_ts(updated_at), id],
            )
        })?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Stamp `last_heartbeat` for a processing item (§4.1 `UpdateHeartbeat`,
    /// §4.3). Does not touch `updated_at`: heartbeats are liveness pings,
    /// not content changes.
    pub fn update_heartbeat(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let now = self.now();
        let changed = with_busy_retry(|| {
            conn.execute(
                "UPDATE queue_items SET last_heartbeat = ?1 WHERE id = ?2",
                rusqlite::params![format_ts(now), id],
            )
        })?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// All items with any of `statuses`, oldest first (§4.1 `ItemsByStatus`).
    pub fn items_by_status(&self, statuses: &[Status]) -> Result<Vec<Item>, StoreError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock();
        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT * FROM queue_items WHERE status IN ({placeholders}) ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
        let rows = stmt.query_map(rusqlite::params_from_iter(params), item_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// All items, oldest first (§4.1 `List`).
    pub fn list(&self) -> Result<Vec<Item>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM queue_items ORDER BY id ASC")?;
        let rows = stmt.query_map([], item_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// The single oldest item in any of `statuses`, or `None` if the queue
    /// is empty for that set (§4.1 `NextForStatuses`, B2: an empty status
    /// list must short-circuit without a query).
    pub fn next_for_statuses(&self, statuses: &[Status]) -> Result<Option<Item>, StoreError> {
        if statuses.is_empty() {
            return Ok(None);
        }
        let conn = self.conn.lock();
        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT * FROM queue_items WHERE status IN ({placeholders}) ORDER BY id ASC LIMIT 1"
        );
        let params: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
        conn.query_row(&sql, rusqlite::params_from_iter(params), item_from_row)
            .optional()
            .map_err(StoreError::from)
    }

    /// Roll every item in a processing status back to its rollback target
    /// (§4.1 `ResetStuckProcessing`). Intended for startup recovery: items
    /// left `Ripping` etc. by a previous crash are not presumed dead, just
    /// restarted from the stage boundary.
    pub fn reset_stuck_processing(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let mut total = 0u64;
        for (processing, target) in Status::ROLLBACK_TABLE {
            let now = self.now();
            let changed = with_busy_retry(|| {
                conn.execute(
                    "UPDATE queue_items SET status = ?1, updated_at = ?2 WHERE status = ?3",
                    rusqlite::params![target.to_string(), format_ts(now), processing.to_string()],
                )
            })?;
            total += changed as u64;
        }
        Ok(total)
    }

    /// Roll back items in a single processing status whose heartbeat is
    /// older than `stale_after`, or which never heartbeat at all (§4.1
    /// `ReclaimStaleProcessing`, §4.3). Scoped to one status so each
    /// workflow lane only reclaims its own in-flight items.
    pub fn reclaim_stale_processing(&self, status: Status, stale_after: Duration) -> Result<u64, StoreError> {
        let Some(target) = status.rollback_trigger() else {
            return Ok(0);
        };
        let conn = self.conn.lock();
        let now = self.now();
        let cutoff = now - chrono::Duration::from_std(stale_after).unwrap_or_else(|_| chrono::Duration::zero());

        let changed = with_busy_retry(|| {
            conn.execute(
                "UPDATE queue_items SET status = ?1, updated_at = ?2
                 WHERE status = ?3 AND (last_heartbeat IS NULL OR last_heartbeat < ?4)",
                rusqlite::params![
                    target.to_string(),
                    format_ts(now),
                    status.to_string(),
                    format_ts(cutoff),
                ],
            )
        })?;
        Ok(changed as u64)
    }

    /// Move `Failed` items back to `Pending` for another attempt (§4.1
    /// `RetryFailed`). An empty `ids` list retries every failed item;
    /// otherwise only the listed ids, and only those currently `Failed`
    /// (P4: an id whose status isn't `Failed` is a no-op). Clears the
    /// error message; leaves `needs_review` untouched so a
    /// previously-flagged item stays flagged.
    pub fn retry_failed(&self, ids: &[i64]) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let now = self.now();
        let pending = Status::Pending.to_string();
        let ts = format_ts(now);
        let failed = Status::Failed.to_string();

        let changed = if ids.is_empty() {
            with_busy_retry(|| {
                conn.execute(
                    "UPDATE queue_items SET status = ?1, error_message = '', updated_at = ?2 WHERE status = ?3",
                    rusqlite::params![pending, ts, failed],
                )
            })?
        } else {
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!(
                "UPDATE queue_items SET status = ?1, error_message = '', updated_at = ?2 \
                 WHERE status = ?3 AND id IN ({placeholders})"
            );
            let mut params: Vec<&dyn rusqlite::ToSql> = vec![&pending, &ts, &failed];
            params.extend(ids.iter().map(|id| id as &dyn rusqlite::ToSql));
            with_busy_retry(|| conn.execute(&sql, params.as_slice()))?
        };
        Ok(changed as u64)
    }

    /// Per-status counts plus the overall total and review flag count
    /// (§4.1 `Stats`).
    pub fn stats(&self) -> Result<Stats, StoreError> {
        let conn = self.conn.lock();
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM queue_items", [], |r| r.get(0))?;
        let needs_review: i64 = conn.query_row(
            "SELECT COUNT(*) FROM queue_items WHERE needs_review != 0",
            [],
            |r| r.get(0),
        )?;

        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM queue_items GROUP BY status")?;
        let rows = stmt.query_map([], |r| {
            let status_str: String = r.get(0)?;
            let count: i64 = r.get(1)?;
            Ok((status_str, count))
        })?;

        let mut by_status = Vec::new();
        for row in rows {
            let (status_str, count) = row?;
            if let Ok(status) = status_str.parse::<Status>() {
                by_status.push((status, count));
            }
        }

        Ok(Stats {
            total,
            by_status,
            needs_review,
        })
    }

    /// Confirm the database is reachable and its schema matches what this
    /// binary expects (§4.1 `Health`/`CheckHealth`).
    pub fn health(&self) -> Result<HealthReport, StoreError> {
        let conn = self.conn.lock();
        let schema_version: i64 =
            conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |r| r.get(0))?;
        let item_count: i64 = conn.query_row("SELECT COUNT(*) FROM queue_items", [], |r| r.get(0))?;
        Ok(HealthReport {
            ok: true,
            schema_version,
            item_count,
        })
    }

    /// Delete a single item (§4.1 `Remove`).
    pub fn remove(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let changed = with_busy_retry(|| conn.execute("DELETE FROM queue_items WHERE id = ?1", [id]))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Delete every item regardless of status (§4.1 `Clear`).
    pub fn clear(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let changed = with_busy_retry(|| conn.execute("DELETE FROM queue_items", []))?;
        Ok(changed as u64)
    }

    /// Delete only `Completed` items (§4.1 `ClearCompleted`).
    pub fn clear_completed(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let changed = with_busy_retry(|| {
            conn.execute(
                "DELETE FROM queue_items WHERE status = ?1",
                [Status::Completed.to_string()],
            )
        })?;
        Ok(changed as u64)
    }

    /// Delete only `Failed` items (§4.1 `ClearFailed`).
    pub fn clear_failed(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let changed = with_busy_retry(|| {
            conn.execute(
                "DELETE FROM queue_items WHERE status = ?1",
                [Status::Failed.to_string()],
            )
        })?;
        Ok(changed as u64)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
