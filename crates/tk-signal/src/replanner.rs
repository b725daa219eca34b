//! Split-plan replanners — `FixedReplanner` (no-op) and `AdaptiveReplanner`
//! (minimize the worst predicted degree of saturation), selected per-signal
//! by an [`AlgorithmFlag`] (spec.md §4.I: "a per-signal integer algorithm
//! flag").

use tk_core::{SplitPlanId, TurningGroupId};

use crate::phase::Phase;
use crate::split::SplitPlanChoiceSet;

/// Chooses the next cycle's `SplitPlan` from the observed degree-of-
/// saturation per turning group.
pub trait Replanner: Send + Sync {
    fn replan(
        &self,
        ds_by_group: &[(TurningGroupId, f32)],
        phases: &[Phase],
        choice_set: &SplitPlanChoiceSet,
        current_plan: SplitPlanId,
    ) -> SplitPlanId;
}

/// Never changes the split plan.
pub struct FixedReplanner;

impl Replanner for FixedReplanner {
    fn replan(
        &self,
        _ds_by_group: &[(TurningGroupId, f32)],
        _phases: &[Phase],
        _choice_set: &SplitPlanChoiceSet,
        current_plan: SplitPlanId,
    ) -> SplitPlanId {
        current_plan
    }
}

/// Picks the choice-set entry that minimizes the worst predicted DS across
/// all observed turning groups.
///
/// Prediction model: a group's DS scales inversely with the green time its
/// phase is allotted, so `predicted_ds = observed_ds * (current_green_ms /
/// candidate_green_ms)`. A candidate that gives a group zero green time
/// predicts DS = infinity for that group (it can no longer be served at
/// all), which correctly disqualifies starving any currently active group.
pub struct AdaptiveReplanner;

impl AdaptiveReplanner {
    fn phase_index_for_group(phases: &[Phase], group: TurningGroupId) -> Option<usize> {
        phases.iter().position(|p| p.grants_turning_group(group))
    }
}

impl Replanner for AdaptiveReplanner {
    fn replan(
        &self,
        ds_by_group: &[(TurningGroupId, f32)],
        phases: &[Phase],
        choice_set: &SplitPlanChoiceSet,
        current_plan: SplitPlanId,
    ) -> SplitPlanId {
        let Some(current) = choice_set.plan(current_plan) else {
            return choice_set.default_plan_id();
        };

        let mut best_plan = current_plan;
        let mut best_worst_ds = f32::INFINITY;

        for candidate in choice_set.plans() {
            let mut worst_ds = 0.0f32;
            for &(group, ds) in ds_by_group {
                let Some(phase_idx) = Self::phase_index_for_group(phases, group) else { continue };
                let current_ms = *current.phase_durations_ms.get(phase_idx).unwrap_or(&0);
                let candidate_ms = *candidate.phase_durations_ms.get(phase_idx).unwrap_or(&0);
                let predicted = if candidate_ms == 0 {
                    f32::INFINITY
                } else {
                    ds * (current_ms as f32 / candidate_ms as f32)
                };
                if predicted > worst_ds {
                    worst_ds = predicted;
                }
            }
            if worst_ds < best_worst_ds {
                best_worst_ds = worst_ds;
                best_plan = candidate.id;
            }
        }

        best_plan
    }
}

/// Per-signal selector between replanning algorithms, loaded from network
/// data as a plain integer flag (spec.md §4.I). `Flashing` is not a
/// replanning strategy but a degraded-operation mode (no cycling, no
/// replanning) that a signal can be placed in by network data or fault
/// handling; `Signal::tick_update` special-cases it before any replanner
/// would run.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum AlgorithmFlag {
    #[default]
    Fixed,
    Adaptive,
    Flashing,
}

impl AlgorithmFlag {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => AlgorithmFlag::Adaptive,
            2 => AlgorithmFlag::Flashing,
            _ => AlgorithmFlag::Fixed,
        }
    }

    pub fn replanner(self) -> Box<dyn Replanner> {
        match self {
            AlgorithmFlag::Fixed | AlgorithmFlag::Flashing => Box::new(FixedReplanner),
            AlgorithmFlag::Adaptive => Box::new(AdaptiveReplanner),
        }
    }
}
