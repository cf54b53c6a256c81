// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Spindle Contributors

//! Lane composition (§4.2.1): two independent schedules over disjoint
//! status sets, built once from a [`StageSet`] at `ConfigureStages` time.

use crate::stage::{Stage, StageSet};
use spindle_core::Status;

/// An independently scheduled sequence of stages.
#[derive(Clone)]
pub(crate) struct Lane {
    pub name: &'static str,
    pub stages: Vec<Stage>,
    /// Trigger statuses of this lane's stages, in stage order — what
    /// `NextForStatuses` polls for.
    pub start_statuses: Vec<Status>,
    /// Processing statuses this lane reclaims on behalf of (the lane's
    /// full structural membership, not just its currently-registered
    /// stages — see [`Lane::from_stages`]).
    pub processing_statuses: Vec<Status>,
    /// Whether this lane publishes queue-started/stage-error
    /// notifications (§4.2.1: foreground does, background doesn't).
    pub notify: bool,
}

impl Lane {
    /// `processing_statuses` is the lane's *structural* membership (every
    /// processing status the lane's two pipeline positions can ever
    /// occupy), not just the ones a currently-registered handler claims.
    /// A crashed-and-restarted daemon may find an item stuck `ripping`
    /// even though this run never registered a ripper (§8 scenario 3) —
    /// the reclaimer has to scan for it on the foreground lane's behalf
    /// regardless, since dispatch capability and reclaim responsibility
    /// are different questions.
    fn from_stages(name: &'static str, stages: Vec<Stage>, processing_statuses: Vec<Status>, notify: bool) -> Option<Self> {
        if stages.is_empty() {
            return None;
        }
        let start_statuses = stages.iter().map(|s| s.trigger).collect();
        Some(Self { name, stages, start_statuses, processing_statuses, notify })
    }

    /// The stage ready to handle an item currently sitting in `status`, if
    /// this lane owns one.
    pub(crate) fn stage_for_status(&self, status: Status) -> Option<&Stage> {
        self.stages.iter().find(|s| s.trigger == status)
    }
}

/// Split a [`StageSet`] into its foreground (identifier + ripper) and
/// background (encoder + organizer) lanes (§4.2.1). A lane with no
/// registered handler is omitted entirely, so the manager spawns nothing
/// for it (§4.2.6 `Start`: "spawn one runner per non-empty lane").
pub(crate) fn build_lanes(stage_set: &StageSet) -> Vec<Lane> {
    let all = stage_set.stages();
    let foreground_stages: Vec<Stage> = all.iter().filter(|s| s.name == "identifier" || s.name == "ripper").cloned().collect();
    let background_stages: Vec<Stage> = all.iter().filter(|s| s.name == "encoder" || s.name == "organizer").cloned().collect();

    let mut lanes = Vec::with_capacity(2);
    if let Some(lane) = Lane::from_stages(
        "foreground",
        foreground_stages,
        vec![Status::Identifying, Status::Ripping],
        true,
    ) {
        lanes.push(lane);
    }
    if let Some(lane) = Lane::from_stages(
        "background",
        background_stages,
        vec![Status::Encoding, Status::Organizing],
        false,
    ) {
        lanes.push(lane);
    }
    lanes
}

#[cfg(test)]
#[path = "lane_tests.rs"]
mod tests;
