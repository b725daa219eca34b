//! `Phase` — the set of movements granted right-of-way together.

use tk_core::{CrossingId, PhaseId, TurningGroupId};

/// One phase of a signal's fixed phase sequence: the turning groups and
/// pedestrian crossings that receive green together.
#[derive(Clone, Debug)]
pub struct Phase {
    pub id: PhaseId,
    /// Turning groups granted `Green` while this phase is active.
    pub turning_groups: Vec<TurningGroupId>,
    /// Crossings granted a walk indication while this phase is active.
    pub crossings: Vec<CrossingId>,
}

impl Phase {
    pub fn new(id: PhaseId, turning_groups: Vec<TurningGroupId>, crossings: Vec<CrossingId>) -> Self {
        Self { id, turning_groups, crossings }
    }

    pub fn grants_turning_group(&self, group: TurningGroupId) -> bool {
        self.turning_groups.contains(&group)
    }

    pub fn grants_crossing(&self, crossing: CrossingId) -> bool {
        self.crossings.contains(&crossing)
    }
}
