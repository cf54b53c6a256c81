// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

use super::*;

#[test]
fn health_check_ready_sets_the_flag() {
    let hc = HealthCheck::ready("ripper", "drive mounted");
    assert!(hc.ready);
    assert_eq!(hc.name, "ripper");
    assert_eq!(hc.detail, "drive mounted");
}

#[test]
fn health_check_not_ready_clears_the_flag() {
    let hc = HealthCheck::not_ready("ripper", "no drive");
    assert!(!hc.ready);
}

#[test]
fn stage_error_from_classified_wraps_it() {
    let classified = ClassifiedError::validation("rip_spec", "missing");
    let err: StageError = classified.clone().into();
    match err {
        StageError::Classified(e) => assert_eq!(e.message, classified.message),
        StageError::Cancelled => panic!("expected Classified"),
    }
}

#[test]
fn stage_error_display_distinguishes_cancellation() {
    assert_eq!(StageError::Cancelled.to_string(), "cancelled");
    let classified = ClassifiedError::internal("op", "boom");
    assert_eq!(StageError::Classified(classified).to_string(), "op: boom");
}
