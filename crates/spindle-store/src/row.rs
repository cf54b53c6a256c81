// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Mapping between [`Item`] and `queue_items` rows.
//!
//! Timestamps are stored as RFC-3339 nanosecond strings in UTC (§6.1).

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use spindle_core::{Item, Status};

pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

pub(crate) fn item_from_row(row: &Row) -> rusqlite::Result<Item> {
    let status_str: String = row.get("status")?;
    let status = status_str
        .parse::<Status>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))?;

    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;
    let last_heartbeat_str: Option<String> = row.get("last_heartbeat")?;

    Ok(Item {
        id: row.get("id")?,
        disc_title: row.get("disc_title")?,
        disc_fingerprint: row.get("disc_fingerprint")?,
        source_path: row.get("source_path")?,
        ripped_file: row.get("ripped_file")?,
        encoded_file: row.get("encoded_file")?,
        final_file: row.get("final_file")?,
        status,
        progress_stage: row.get("progress_stage")?,
        progress_percent: row.get("progress_percent")?,
        progress_message: row.get("progress_message")?,
        error_message: row.get("error_message")?,
        last_heartbeat: last_heartbeat_str.map(|s| parse_ts(&s)).transpose()?,
        needs_review: row.get::<_, i64>("needs_review")? != 0,
        review_reason: row.get("review_reason")?,
        created_at: parse_ts(&created_at_str)?,
        updated_at: parse_ts(&updated_at_str)?,
        media_info_json: row.get("media_info_json")?,
        metadata_json: row.get("metadata_json")?,
        rip_spec_data: row.get("rip_spec_data")?,
        encoding_details_json: row.get("encoding_details_json")?,
        active_episode_key: row.get("active_episode_key")?,
    })
}

#[cfg(test)]
#[path = "row_tests.rs"]
mod tests;
