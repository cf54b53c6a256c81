// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! The central queue record.

use crate::status::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single disc (or manually ingested file) flowing through the pipeline.
///
/// Every field after `id` is mutable. The store owns `id`, `created_at`,
/// and `updated_at`; everything else is written by the lane runner that
/// currently holds the item, or by an administrative operation (retry,
/// clear, remove).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub disc_title: String,
    pub disc_fingerprint: Option<String>,

    pub source_path: Option<String>,
    pub ripped_file: Option<String>,
    pub encoded_file: Option<String>,
    pub final_file: Option<String>,

    pub status: Status,

    pub progress_stage: String,
    pub progress_percent: f64,
    pub progress_message: String,

    pub error_message: String,

    pub last_heartbeat: Option<DateTime<Utc>>,

    pub needs_review: bool,
    pub review_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Stage-owned opaque payloads. The core never parses or validates these.
    pub media_info_json: Option<String>,
    pub metadata_json: Option<String>,
    pub rip_spec_data: Option<String>,
    pub encoding_details_json: Option<String>,
    pub active_episode_key: Option<String>,
}

impl Item {
    /// Build an unpersisted item for a freshly inserted disc. `id`,
    /// `created_at`, and `updated_at` are placeholders the store overwrites
    /// on insert.
    pub fn for_new_disc(disc_title: impl Into<String>, disc_fingerprint: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            disc_title: disc_title.into(),
            disc_fingerprint,
            source_path: None,
            ripped_file: None,
            encoded_file: None,
            final_file: None,
            status: Status::Pending,
            progress_stage: String::new(),
            progress_percent: 0.0,
            progress_message: String::new(),
            error_message: String::new(),
            last_heartbeat: None,
            needs_review: false,
            review_reason: None,
            created_at: now,
            updated_at: now,
            media_info_json: None,
            metadata_json: None,
            rip_spec_data: None,
            encoding_details_json: None,
            active_episode_key: None,
        }
    }

    /// Build an unpersisted item for a manually ingested file, which
    /// short-circuits straight to `ripped` (§3 Lifecycle).
    pub fn for_new_file(source_path: impl Into<String>) -> Self {
        let path = source_path.into();
        let disc_title = path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&path)
            .to_string();
        let now = Utc::now();
        Self {
            id: 0,
            disc_title,
            disc_fingerprint: None,
            source_path: Some(path.clone()),
            ripped_file: Some(path),
            encoded_file: None,
            final_file: None,
            status: Status::Ripped,
            progress_stage: String::new(),
            progress_percent: 100.0,
            progress_message: String::new(),
            error_message: String::new(),
            last_heartbeat: None,
            needs_review: false,
            review_reason: None,
            created_at: now,
            updated_at: now,
            media_info_json: None,
            metadata_json: None,
            rip_spec_data: None,
            encoding_details_json: None,
            active_episode_key: None,
        }
    }

    /// Clamp `progress_percent` into `[0, 100]` (invariant I3). Called by the
    /// store immediately before every write that touches this column.
    pub fn clamp_progress(&mut self) {
        self.progress_percent = self.progress_percent.clamp(0.0, 100.0);
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
