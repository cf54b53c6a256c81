// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! The item lifecycle state machine.
//!
//! ```text
//! pending → identifying → identified → ripping → ripped
//!        → encoding → encoded → organizing → completed
//!                                          ↘ failed (terminal)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The full set of lifecycle states an [`Item`](crate::Item) can occupy.
///
/// Closed by construction: there is no `Other(String)` escape hatch, so a
/// row with an unrecognized status string fails to parse (invariant I1)
/// instead of silently becoming some default state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Identifying,
    Identified,
    Ripping,
    Ripped,
    Encoding,
    Encoded,
    Organizing,
    Completed,
    Failed,
}

/// Returned when a stored or supplied status string does not name a known
/// [`Status`] variant.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl Status {
    /// All variants, in pipeline order (terminal states last).
    pub const ALL: [Status; 10] = [
        Status::Pending,
        Status::Identifying,
        Status::Identified,
        Status::Ripping,
        Status::Ripped,
        Status::Encoding,
        Status::Encoded,
        Status::Organizing,
        Status::Completed,
        Status::Failed,
    ];

    /// The fixed rollback table: processing status → trigger status.
    ///
    /// Driven by this table, not computed from status names (§4.1). Used by
    /// `ResetStuckProcessing` (all rows) and `ReclaimStaleProcessing`
    /// (rows filtered to a caller-supplied status set).
    pub const ROLLBACK_TABLE: [(Status, Status); 4] = [
        (Status::Identifying, Status::Pending),
        (Status::Ripping, Status::Identified),
        (Status::Encoding, Status::Ripped),
        (Status::Organizing, Status::Encoded),
    ];

    /// True for the four "-ing" statuses a handler occupies while running.
    pub fn is_processing(self) -> bool {
        Self::ROLLBACK_TABLE.iter().any(|(p, _)| *p == self)
    }

    /// True for the two statuses an item never leaves except by explicit retry.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }

    /// The trigger status a processing status rolls back to on reclaim or
    /// reset. `None` for non-processing statuses.
    pub fn rollback_trigger(self) -> Option<Status> {
        Self::ROLLBACK_TABLE
            .iter()
            .find(|(p, _)| *p == self)
            .map(|(_, t)| *t)
    }

    /// True for the "active" set used by queue-completion bookkeeping
    /// (§4.2.5): every status except the two terminal ones.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Identifying => "identifying",
            Status::Identified => "identified",
            Status::Ripping => "ripping",
            Status::Ripped => "ripped",
            Status::Encoding => "encoding",
            Status::Encoded => "encoded",
            Status::Organizing => "organizing",
            Status::Completed => "completed",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<&str> for Status {
    type Error = UnknownStatus;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for Status {
    type Error = UnknownStatus;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.as_str().parse()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
