//! `Signal` — one controlled intersection's phase/split/offset state machine
//! (spec.md §4.I).

use std::collections::HashMap;

use tk_core::buffered::{MutexStrategy, SyncBufferedCell};
use tk_core::{CrossingId, LaneRef, NodeId, SignalId, SplitPlanId, TurningGroupId};
use tk_spatial::RoadTopology;

use crate::color::TrafficColor;
use crate::detector::DetectorBank;
use crate::error::{SignalError, SignalResult};
use crate::offset::Offset;
use crate::phase::Phase;
use crate::replanner::{AlgorithmFlag, Replanner};
use crate::split::SplitPlanChoiceSet;

/// Warning interval published on entry into a phase's green window, before
/// `TrafficColor::Green` (spec.md §4.I's "red-amber").
const RED_AMBER_MS: u32 = 1_000;
/// Clearance interval published at the end of a phase's green window, before
/// it reverts to `TrafficColor::Red` (spec.md §4.I's "amber").
const AMBER_MS: u32 = 1_000;

/// Tracks which phase is currently active and how many full cycles have
/// elapsed since the signal started.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct PhaseCounter {
    pub active_phase_index: usize,
    pub cycle_count: u64,
}

/// One signalized intersection: phases, cycle, split-plan choice set,
/// offset, and the published per-movement `TrafficColor`s.
///
/// Colors are published through [`SyncBufferedCell`], whose
/// [`MutexStrategy`] is an explicit argument to [`Signal::new`] rather than
/// a hardcoded choice — readers (person-group workers deciding whether to
/// proceed through an intersection) may run on a different work group than
/// the signal that flips the cell, so a plain
/// [`tk_core::buffered::BufferedCell`] is only sound if the caller knows
/// reader and writer share one barrier group. Whoever constructs a signal
/// from network data is expected to source this from the kernel's
/// `mutex_strategy` setting.
pub struct Signal {
    pub id: SignalId,
    pub node: NodeId,
    phases: Vec<Phase>,
    choice_set: SplitPlanChoiceSet,
    active_plan: SplitPlanId,
    offset: Offset,
    phase_counter: PhaseCounter,
    curr_cycle_timer_ms: u32,
    algorithm: AlgorithmFlag,
    replanner: Box<dyn Replanner>,
    detectors: DetectorBank,
    driver_colors: HashMap<TurningGroupId, SyncBufferedCell<TrafficColor>>,
    pedestrian_colors: HashMap<CrossingId, SyncBufferedCell<TrafficColor>>,
}

impl Signal {
    pub fn new(
        id: SignalId,
        node: NodeId,
        phases: Vec<Phase>,
        choice_set: SplitPlanChoiceSet,
        offset: Offset,
        algorithm: AlgorithmFlag,
        mutex_strategy: MutexStrategy,
    ) -> SignalResult<Self> {
        if phases.is_empty() {
            return Err(SignalError::NoPhases);
        }
        if choice_set.phase_count() != phases.len() {
            return Err(SignalError::PhaseDurationMismatch {
                phases: phases.len(),
                count: choice_set.phase_count(),
            });
        }

        let mut driver_colors = HashMap::new();
        let mut pedestrian_colors = HashMap::new();
        for phase in &phases {
            for &group in &phase.turning_groups {
                driver_colors
                    .entry(group)
                    .or_insert_with(|| SyncBufferedCell::new(TrafficColor::Red, mutex_strategy));
            }
            for &crossing in &phase.crossings {
                pedestrian_colors
                    .entry(crossing)
                    .or_insert_with(|| SyncBufferedCell::new(TrafficColor::Red, mutex_strategy));
            }
        }

        let active_plan = choice_set.default_plan_id();
        let replanner = algorithm.replanner();

        Ok(Self {
            id,
            node,
            phases,
            choice_set,
            active_plan,
            offset,
            phase_counter: PhaseCounter::default(),
            curr_cycle_timer_ms: 0,
            algorithm,
            replanner,
            detectors: DetectorBank::new(),
            driver_colors,
            pedestrian_colors,
        })
    }

    pub fn algorithm(&self) -> AlgorithmFlag {
        self.algorithm
    }

    pub fn active_plan(&self) -> SplitPlanId {
        self.active_plan
    }

    pub fn phase_counter(&self) -> PhaseCounter {
        self.phase_counter
    }

    /// Feed a loop-detector occupancy sample for `group` this tick.
    pub fn record_occupied(&mut self, group: TurningGroupId, duration_ms: u32) {
        self.detectors.record_occupied(group, duration_ms);
    }

    /// Step 1-3 of the per-tick update (spec.md §4.I). Writes new colors to
    /// the *pending* side of each buffered cell; call [`Signal::flip`]
    /// during the kernel's dedicated flip phase to publish them.
    ///
    /// `AlgorithmFlag::Flashing` bypasses normal phase cycling entirely —
    /// see [`Signal::tick_update_flashing`].
    pub fn tick_update(&mut self, tick_duration_ms: u32) {
        if self.algorithm == AlgorithmFlag::Flashing {
            self.tick_update_flashing();
            return;
        }

        // Step 1: advance the cycle timer.
        self.curr_cycle_timer_ms += tick_duration_ms;
        let cycle_ms = self.choice_set.cycle_ms();
        let mut is_new_cycle = false;
        if cycle_ms > 0 && self.curr_cycle_timer_ms >= cycle_ms {
            is_new_cycle = true;
            self.curr_cycle_timer_ms %= cycle_ms;
        }

        // Step 2: locate the active phase under the offset-shifted timer and
        // publish colors. The active phase passes through a red-amber
        // warning on entry and an amber clearance window before it ends;
        // every other phase stays red (spec.md §4.I's six-color contract).
        let effective_timer = if cycle_ms > 0 {
            (self.curr_cycle_timer_ms + self.offset.0) % cycle_ms
        } else {
            0
        };
        let plan = self.choice_set.plan(self.active_plan);
        let phase_idx = self
            .choice_set
            .active_phase_index(self.active_plan, effective_timer)
            .unwrap_or(0);
        self.phase_counter.active_phase_index = phase_idx;

        let phase_start_ms = plan
            .map(|p| p.phase_durations_ms[..phase_idx].iter().sum::<u32>())
            .unwrap_or(0);
        let phase_dur_ms = plan
            .and_then(|p| p.phase_durations_ms.get(phase_idx).copied())
            .unwrap_or(0);
        let position_in_phase = effective_timer.saturating_sub(phase_start_ms);
        let red_amber_ms = RED_AMBER_MS.min(phase_dur_ms / 3);
        let amber_ms = AMBER_MS.min(phase_dur_ms / 3);

        for (i, phase) in self.phases.iter().enumerate() {
            let color = if i != phase_idx {
                TrafficColor::Red
            } else if position_in_phase < red_amber_ms {
                TrafficColor::RedAmber
            } else if phase_dur_ms > 0 && position_in_phase >= phase_dur_ms - amber_ms {
                TrafficColor::Amber
            } else {
                TrafficColor::Green
            };
            for &group in &phase.turning_groups {
                if let Some(cell) = self.driver_colors.get(&group) {
                    cell.set(color);
                }
                if color == TrafficColor::Green {
                    self.detectors.record_green(group, tick_duration_ms);
                }
            }
            let ped_color = if i == phase_idx && color == TrafficColor::Green {
                TrafficColor::Green
            } else {
                TrafficColor::Red
            };
            for &crossing in &phase.crossings {
                if let Some(cell) = self.pedestrian_colors.get(&crossing) {
                    cell.set(ped_color);
                }
            }
        }

        // Step 3: on a new cycle, replan the split plan from observed DS.
        if is_new_cycle {
            self.phase_counter.cycle_count += 1;
            let ds = self.detectors.ds_by_group();
            self.active_plan =
                self.replanner.replan(&ds, &self.phases, &self.choice_set, self.active_plan);
            self.detectors.reset_cycle();
        }
    }

    /// `AlgorithmFlag::Flashing` mode: no phase cycling, no replanning — the
    /// signal is running in degraded/caution mode (e.g. overnight or a
    /// controller fault). By convention the first phase is the major
    /// approach and caution-flashes amber; every other approach flashes red,
    /// as does every pedestrian crossing.
    fn tick_update_flashing(&mut self) {
        for (i, phase) in self.phases.iter().enumerate() {
            let color = if i == 0 { TrafficColor::FlashingAmber } else { TrafficColor::FlashingRed };
            for &group in &phase.turning_groups {
                if let Some(cell) = self.driver_colors.get(&group) {
                    cell.set(color);
                }
            }
            for &crossing in &phase.crossings {
                if let Some(cell) = self.pedestrian_colors.get(&crossing) {
                    cell.set(TrafficColor::FlashingRed);
                }
            }
        }
    }

    /// Promote every pending color to current. Must only run during the
    /// kernel's flip phase.
    pub fn flip(&self) {
        for cell in self.driver_colors.values() {
            cell.flip();
        }
        for cell in self.pedestrian_colors.values() {
            cell.flip();
        }
    }

    /// The currently published color for the movement granted by `group`.
    pub fn get_driver_light_for_group(&self, group: TurningGroupId) -> TrafficColor {
        self.driver_colors.get(&group).map(|c| c.get()).unwrap_or_default()
    }

    /// spec.md §4.I: "the Signal exposes `getDriverLight(fromLane, toLane)`".
    /// Resolves the pair to its `TurningGroupId` via `topology`'s sealed
    /// connector/turning-path arena and returns that group's currently
    /// published color — red if the pair names no movement this signal
    /// controls.
    pub fn get_driver_light(&self, topology: &RoadTopology, from_lane: LaneRef, to_lane: LaneRef) -> TrafficColor {
        match topology.turning_group_for_lanes(from_lane, to_lane) {
            Some(group) => self.get_driver_light_for_group(group),
            None => TrafficColor::default(),
        }
    }

    /// The currently published pedestrian indication for `crossing`.
    pub fn get_pedestrian_light(&self, crossing: CrossingId) -> TrafficColor {
        self.pedestrian_colors.get(&crossing).map(|c| c.get()).unwrap_or_default()
    }
}
