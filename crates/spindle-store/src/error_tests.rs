// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

use super::*;

fn sqlite_failure(code: rusqlite::ErrorCode) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error {
            code,
            extended_code: 0,
        },
        None,
    )
}

#[test]
fn busy_and_locked_are_retryable() {
    assert!(StoreError::is_retryable(&sqlite_failure(
        rusqlite::ErrorCode::DatabaseBusy
    )));
    assert!(StoreError::is_retryable(&sqlite_failure(
        rusqlite::ErrorCode::DatabaseLocked
    )));
}

#[test]
fn other_sqlite_errors_are_not_retryable() {
    assert!(!StoreError::is_retryable(&sqlite_failure(
        rusqlite::ErrorCode::ConstraintViolation
    )));
    assert!(!StoreError::is_retryable(&rusqlite::Error::QueryReturnedNoRows));
}

#[test]
fn schema_mismatch_message_instructs_clearing_the_database() {
    let err = StoreError::SchemaMismatch {
        found: 1,
        expected: 2,
    };
    assert!(err.to_string().contains("clear the database"));
}
