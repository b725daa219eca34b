use tk_core::buffered::MutexStrategy;
use tk_core::{CrossingId, LaneRef, NodeId, PhaseId, SegmentId, SignalId, SplitPlanId, TurningGroupId};
use tk_spatial::{LaneRules, RoadTopologyBuilder};

use crate::{AlgorithmFlag, Offset, Phase, Signal, SplitPlan, SplitPlanChoiceSet, TrafficColor};

fn two_phase_signal(algorithm: AlgorithmFlag) -> Signal {
    let phases = vec![
        Phase::new(PhaseId(0), vec![TurningGroupId(0)], vec![]),
        Phase::new(PhaseId(1), vec![TurningGroupId(1)], vec![CrossingId(0)]),
    ];
    let choice_set = SplitPlanChoiceSet::new(vec![
        SplitPlan::new(SplitPlanId(0), vec![30_000, 30_000]),
        SplitPlan::new(SplitPlanId(1), vec![45_000, 15_000]),
    ])
    .unwrap();
    Signal::new(SignalId(0), NodeId(0), phases, choice_set, Offset(0), algorithm, MutexStrategy::Epoch).unwrap()
}

#[test]
fn fixed_signal_alternates_green_within_cycle() {
    let mut signal = two_phase_signal(AlgorithmFlag::Fixed);

    signal.tick_update(1_000);
    signal.flip();
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(0)), TrafficColor::Green);
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(1)), TrafficColor::Red);

    // Advance past the first phase's 30s boundary.
    for _ in 0..30 {
        signal.tick_update(1_000);
        signal.flip();
    }
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(0)), TrafficColor::Red);
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(1)), TrafficColor::Green);
    assert_eq!(signal.get_pedestrian_light(CrossingId(0)), TrafficColor::Green);
}

#[test]
fn colors_only_change_on_flip() {
    let mut signal = two_phase_signal(AlgorithmFlag::Fixed);
    // First 28 ticks stay in phase 0's steady green; color shouldn't move
    // before flip.
    for _ in 0..28 {
        signal.tick_update(1_000);
        signal.flip();
    }
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(0)), TrafficColor::Green);

    // 29th tick enters phase 0's amber clearance window, but still in
    // pending state only — published value shouldn't move before flip.
    signal.tick_update(1_000);
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(0)), TrafficColor::Green);
    signal.flip();
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(0)), TrafficColor::Amber);

    signal.tick_update(2_000); // crosses into phase 1 in pending state only
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(0)), TrafficColor::Amber);
    signal.flip();
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(0)), TrafficColor::Red);
}

#[test]
fn amber_clearance_then_red_amber_on_phase_entry() {
    let mut signal = two_phase_signal(AlgorithmFlag::Fixed);
    // Run to 29.5s — inside phase 0's 1s amber clearance window.
    for _ in 0..29 {
        signal.tick_update(1_000);
        signal.flip();
    }
    signal.tick_update(500);
    signal.flip();
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(0)), TrafficColor::Amber);

    // 30.5s — 0.5s into phase 1's red-amber warning window.
    signal.tick_update(1_000);
    signal.flip();
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(1)), TrafficColor::RedAmber);

    // 31.5s — past the red-amber window, phase 1 now shows steady green.
    signal.tick_update(1_000);
    signal.flip();
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(1)), TrafficColor::Green);
}

#[test]
fn flashing_mode_publishes_flashing_colors_for_every_movement() {
    let mut signal = two_phase_signal(AlgorithmFlag::Flashing);
    signal.tick_update(1_000);
    signal.flip();
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(0)), TrafficColor::FlashingAmber);
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(1)), TrafficColor::FlashingRed);
    assert_eq!(signal.get_pedestrian_light(CrossingId(0)), TrafficColor::FlashingRed);

    // Flashing never cycles or replans.
    for _ in 0..100 {
        signal.tick_update(1_000);
        signal.flip();
    }
    assert_eq!(signal.active_plan(), SplitPlanId(0));
    assert_eq!(signal.get_driver_light_for_group(TurningGroupId(0)), TrafficColor::FlashingAmber);
}

#[test]
fn fixed_replanner_never_changes_plan() {
    let mut signal = two_phase_signal(AlgorithmFlag::Fixed);
    let cycle_ms = 60_000;
    for _ in 0..(cycle_ms / 1_000 + 1) {
        signal.tick_update(1_000);
        signal.flip();
    }
    assert_eq!(signal.active_plan(), SplitPlanId(0));
    assert_eq!(signal.phase_counter().cycle_count, 1);
}

#[test]
fn get_driver_light_resolves_lane_pair_through_topology() {
    let mut topo = RoadTopologyBuilder::new();
    let link_in = topo.add_link(NodeId(0), NodeId(1));
    let link_out = topo.add_link(NodeId(1), NodeId(2));
    let seg_in = topo.add_segment(link_in, NodeId(0), NodeId(1), 10_000);
    let seg_out = topo.add_segment(link_out, NodeId(1), NodeId(2), 10_000);
    let lane_in = topo.add_lane(seg_in, 350, LaneRules::IS_VEHICLE);
    let lane_out = topo.add_lane(seg_out, 350, LaneRules::IS_VEHICLE);
    let from_lane = LaneRef::new(seg_in, lane_in);
    let to_lane = LaneRef::new(seg_out, lane_out);
    let connector = topo.add_connector(from_lane, to_lane);
    let group = topo.add_turning_group(NodeId(1), seg_in, seg_out);
    topo.add_turning_path(group, connector);
    let topology = topo.build();

    assert_eq!(group, TurningGroupId(0));
    let mut signal = two_phase_signal(AlgorithmFlag::Fixed);
    signal.tick_update(1_000);
    signal.flip();
    assert_eq!(signal.get_driver_light(&topology, from_lane, to_lane), TrafficColor::Green);

    // An unconnected lane pair names no turning movement this signal controls.
    let unrelated = LaneRef::new(SegmentId(99), lane_out);
    assert_eq!(signal.get_driver_light(&topology, unrelated, to_lane), TrafficColor::default());
}

#[test]
fn adaptive_replanner_shifts_plan_under_saturation() {
    let mut signal = two_phase_signal(AlgorithmFlag::Adaptive);
    // Saturate group 0's approach every tick of its green window.
    for _ in 0..30 {
        signal.record_occupied(TurningGroupId(0), 1_000);
        signal.tick_update(1_000);
        signal.flip();
    }
    for _ in 0..30 {
        signal.tick_update(1_000);
        signal.flip();
    }
    // Group 0 was saturated (DS ~= 1.0) while on the 30/30 plan; the 45/15
    // plan gives it more green, so the adaptive replanner should prefer it.
    assert_eq!(signal.active_plan(), SplitPlanId(1));
}
