// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

use super::*;

#[test]
fn already_running_has_a_readable_message() {
    let err = WorkflowError::AlreadyRunning;
    assert_eq!(err.to_string(), "workflow manager is already running");
}

#[test]
fn invalid_heartbeat_config_names_both_durations() {
    let err = WorkflowError::InvalidHeartbeatConfig {
        interval_ms: 1000,
        timeout_ms: 500,
    };
    let msg = err.to_string();
    assert!(msg.contains("1000"));
    assert!(msg.contains("500"));
}

#[test]
fn store_error_wraps_transparently() {
    let store_err = spindle_store::StoreError::NotFound(7);
    let wrapped = WorkflowError::from(store_err);
    assert!(wrapped.to_string().contains("7"));
}
