// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

use super::*;
use crate::handler::FakeStageHandler;
use std::sync::Arc;

fn full_stage_set() -> StageSet {
    StageSet {
        identifier: Some(Arc::new(FakeStageHandler::new("identifier"))),
        ripper: Some(Arc::new(FakeStageHandler::new("ripper"))),
        encoder: Some(Arc::new(FakeStageHandler::new("encoder"))),
        organizer: Some(Arc::new(FakeStageHandler::new("organizer"))),
    }
}

#[test]
fn build_lanes_splits_into_foreground_and_background() {
    let lanes = build_lanes(&full_stage_set());
    assert_eq!(lanes.len(), 2);

    let foreground = lanes.iter().find(|l| l.name == "foreground").unwrap();
    assert_eq!(foreground.stages.iter().map(|s| s.name).collect::<Vec<_>>(), vec!["identifier", "ripper"]);
    assert!(foreground.notify);

    let background = lanes.iter().find(|l| l.name == "background").unwrap();
    assert_eq!(background.stages.iter().map(|s| s.name).collect::<Vec<_>>(), vec!["encoder", "organizer"]);
    assert!(!background.notify);
}

#[test]
fn lane_start_statuses_are_disjoint_across_lanes() {
    let lanes = build_lanes(&full_stage_set());
    let foreground = lanes.iter().find(|l| l.name == "foreground").unwrap();
    let background = lanes.iter().find(|l| l.name == "background").unwrap();

    for status in &foreground.start_statuses {
        assert!(!background.start_statuses.contains(status), "lane start-status sets must be disjoint (§4.2.2)");
    }
}

#[test]
fn a_lane_with_no_registered_handler_is_omitted() {
    let set = StageSet {
        identifier: Some(Arc::new(FakeStageHandler::new("identifier"))),
        ripper: Some(Arc::new(FakeStageHandler::new("ripper"))),
        encoder: None,
        organizer: None,
    };
    let lanes = build_lanes(&set);
    assert_eq!(lanes.len(), 1);
    assert_eq!(lanes[0].name, "foreground");
}

#[test]
fn no_stages_at_all_produces_no_lanes() {
    let lanes = build_lanes(&StageSet::default());
    assert!(lanes.is_empty());
}

#[test]
fn reclaim_set_is_structural_even_without_a_registered_ripper() {
    let set = StageSet {
        identifier: Some(Arc::new(FakeStageHandler::new("identifier"))),
        ripper: None,
        encoder: None,
        organizer: None,
    };
    let lanes = build_lanes(&set);
    let foreground = lanes.iter().find(|l| l.name == "foreground").unwrap();
    assert!(
        foreground.processing_statuses.contains(&Status::Ripping),
        "reclaim must cover ripping even with no ripper registered (§8 scenario 3)"
    );
    assert!(foreground.processing_statuses.contains(&Status::Identifying));
    assert_eq!(foreground.start_statuses, vec![Status::Pending], "dispatch only covers registered stages");
}

#[test]
fn stage_for_status_finds_the_owning_stage() {
    let lanes = build_lanes(&full_stage_set());
    let foreground = lanes.iter().find(|l| l.name == "foreground").unwrap();

    assert_eq!(foreground.stage_for_status(Status::Pending).unwrap().name, "identifier");
    assert_eq!(foreground.stage_for_status(Status::Identified).unwrap().name, "ripper");
    assert!(foreground.stage_for_status(Status::Ripped).is_none());
}
