// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Schema creation and the version guard (§6.1, §4.1 "Schema guarding").
//!
//! There is no in-place migration path: a `schema_version` mismatch fails
//! `Open` outright rather than attempting to upgrade the row format. This
//! is a transient working queue, not a system of record.

use crate::error::StoreError;
use rusqlite::Connection;

/// Bump whenever `queue_items` or `schema_version`'s shape changes.
pub const SCHEMA_VERSION: i64 = 1;

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS queue_items (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    disc_title              TEXT NOT NULL,
    disc_fingerprint        TEXT,
    source_path             TEXT,
    ripped_file             TEXT,
    encoded_file            TEXT,
    final_file              TEXT,
    status                  TEXT NOT NULL,
    progress_stage          TEXT NOT NULL DEFAULT '',
    progress_percent        REAL NOT NULL DEFAULT 0,
    progress_message        TEXT NOT NULL DEFAULT '',
    error_message           TEXT NOT NULL DEFAULT '',
    last_heartbeat          TEXT,
    needs_review            INTEGER NOT NULL DEFAULT 0,
    review_reason           TEXT,
    created_at              TEXT NOT NULL,
    updated_at              TEXT NOT NULL,
    media_info_json         TEXT,
    metadata_json           TEXT,
    rip_spec_data           TEXT,
    encoding_details_json   TEXT,
    active_episode_key      TEXT
);
CREATE INDEX IF NOT EXISTS idx_queue_items_status ON queue_items(status);
CREATE INDEX IF NOT EXISTS idx_queue_items_fingerprint ON queue_items(disc_fingerprint);
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);
";

/// Create the schema if absent, or verify the stored version matches
/// [`SCHEMA_VERSION`]. Returns [`StoreError::SchemaMismatch`] on a mismatch
/// without touching any data.
pub(crate) fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(CREATE_TABLES)?;

    let row_count: i64 = conn.query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))?;

    if row_count == 0 {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            rusqlite::params![SCHEMA_VERSION],
        )?;
        return Ok(());
    }

    let found: i64 = conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |r| {
        r.get(0)
    })?;

    if found != SCHEMA_VERSION {
        return Err(StoreError::SchemaMismatch {
            found,
            expected: SCHEMA_VERSION,
        });
    }

    Ok(())
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
