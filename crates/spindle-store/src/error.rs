// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Errors surfaced by the queue store.

use thiserror::Error;

/// Errors the queue store can return.
///
/// The store retries busy/locked errors internally (§4.1); `Busy` is only
/// returned once the retry budget (5 attempts, 10ms→200ms backoff) is
/// exhausted.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database busy after retrying")]
    Busy,

    #[error("validation: {0}")]
    Validation(String),

    #[error(
        "schema version mismatch: database has v{found}, this build expects v{expected}; clear the database to continue"
    )]
    SchemaMismatch { found: i64, expected: i64 },

    #[error("item {0} not found")]
    NotFound(i64),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True for the narrow class of errors the store's retry loop targets:
    /// `SQLITE_BUSY` and `SQLITE_LOCKED`.
    pub(crate) fn is_retryable(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
