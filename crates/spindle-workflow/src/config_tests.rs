// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

use super::*;

#[test]
fn default_satisfies_the_five_times_ratio() {
    let cfg = ManagerConfig::default();
    assert!(cfg.heartbeat_timeout > cfg.heartbeat_interval);
    assert!(cfg.heartbeat_timeout >= cfg.heartbeat_interval * 5);
}

#[test]
fn new_accepts_a_timeout_strictly_greater_than_interval() {
    let cfg = ManagerConfig::new(
        Duration::from_millis(50),
        Duration::from_millis(10),
        Duration::from_millis(50),
    )
    .unwrap();
    assert_eq!(cfg.heartbeat_interval, Duration::from_millis(10));
}

#[test]
fn new_rejects_equal_interval_and_timeout() {
    let err = ManagerConfig::new(
        Duration::from_millis(50),
        Duration::from_millis(10),
        Duration::from_millis(10),
    )
    .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidHeartbeatConfig { .. }));
}

#[test]
fn new_rejects_timeout_less_than_interval() {
    let err = ManagerConfig::new(
        Duration::from_millis(50),
        Duration::from_millis(10),
        Duration::from_millis(5),
    )
    .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidHeartbeatConfig { .. }));
}
