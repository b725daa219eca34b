//! Lane movement-rule bitset and the sealed road-furniture arena
//! (segments, lanes, connectors, turning groups/paths/conflicts, crossings,
//! bus stops) referenced by `tk-signal` and `tk-roles`.
//!
//! # Bit layout
//!
//! `LaneRules` bit indices are stable across runs (spec.md §6: "network
//! files remain loadable") — do not reorder the enumeration below; add new
//! rules only at the end, before `LaneRules::ALL` changes meaning.

use tk_core::{
    BusStopId, ConnectorId, CrossingId, LaneId, LaneRef, LinkId, NodeId, SegmentId,
    TurningConflictId, TurningGroupId, TurningPathId,
};

// ── Lane movement rules ────────────────────────────────────────────────────────

macro_rules! lane_rule_bits {
    ($($(#[$attr:meta])* $name:ident = $bit:expr;)*) => {
        /// Bitset of permitted movements / classifications for one lane.
        ///
        /// Bit indices are part of the on-disk contract (spec.md §6) — stable
        /// across runs so network files remain loadable.
        #[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct LaneRules(pub u32);

        impl LaneRules {
            $(
                $(#[$attr])*
                pub const $name: LaneRules = LaneRules(1 << $bit);
            )*

            #[inline]
            pub fn has(self, rule: LaneRules) -> bool {
                self.0 & rule.0 != 0
            }

            #[inline]
            pub fn with(self, rule: LaneRules) -> LaneRules {
                LaneRules(self.0 | rule.0)
            }
        }

        impl std::ops::BitOr for LaneRules {
            type Output = LaneRules;
            fn bitor(self, rhs: LaneRules) -> LaneRules {
                LaneRules(self.0 | rhs.0)
            }
        }
    };
}

lane_rule_bits! {
    /// Lane may carry motor vehicles.
    IS_VEHICLE = 0;
    /// Lane may carry bicycles.
    IS_BICYCLE = 1;
    /// Lane is a pedestrian facility (sidewalk).
    IS_PEDESTRIAN = 2;
    /// Lane is a dedicated bus lane.
    IS_BUS = 3;
    /// Lane is a high-occupancy-vehicle lane.
    IS_HOV = 4;
    /// Through (straight) movement permitted from this lane.
    CAN_GO_STRAIGHT = 5;
    /// Left turn permitted from this lane.
    CAN_GO_LEFT = 6;
    /// Right turn permitted from this lane.
    CAN_GO_RIGHT = 7;
    /// Lane change to the left neighbor lane permitted.
    CAN_CHANGE_LEFT = 8;
    /// Lane change to the right neighbor lane permitted.
    CAN_CHANGE_RIGHT = 9;
    /// Right turn on red permitted from this lane.
    CAN_TURN_ON_RED = 10;
    /// Vehicles may stop/park in this lane.
    CAN_STOP_PARK = 11;
    /// Lane is a road shoulder (not a normal travel lane).
    IS_ROAD_SHOULDER = 12;
    /// U-turn permitted from this lane.
    U_TURN_ALLOWED = 13;
}

// ── Sealed road-furniture arena ─────────────────────────────────────────────────

/// One lane within a [`RoadSegment`].
#[derive(Clone, Debug)]
pub struct Lane {
    pub id: LaneId,
    pub segment: SegmentId,
    /// Width in centimetres.
    pub width_cm: u32,
    pub rules: LaneRules,
}

/// A directed, drivable unit between two nodes along a [`Link`], carrying one
/// or more lanes. Segments are the addressing granularity for queuing,
/// occupancy, and `next_segment_requested` (spec.md §3).
#[derive(Clone, Debug)]
pub struct RoadSegment {
    pub id: SegmentId,
    pub link: LinkId,
    pub from_node: NodeId,
    pub to_node: NodeId,
    pub length_cm: i64,
    pub lanes: Vec<LaneId>,
}

/// An ordered run of segments between two intersections — the unit
/// applications group for routing and display (spec.md §3).
#[derive(Clone, Debug)]
pub struct Link {
    pub id: LinkId,
    pub from_node: NodeId,
    pub to_node: NodeId,
    pub segments: Vec<SegmentId>,
}

/// A permitted (from-lane, to-lane) pair across a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LaneConnector {
    pub id: ConnectorId,
    pub from: LaneRef,
    pub to: LaneRef,
}

/// All connectors sharing one from-segment and one to-segment at a node —
/// the unit signals grant right-of-way to.
#[derive(Clone, Debug)]
pub struct TurningGroup {
    pub id: TurningGroupId,
    pub node: NodeId,
    pub from_segment: SegmentId,
    pub to_segment: SegmentId,
    pub paths: Vec<TurningPathId>,
}

/// A single turning path within a [`TurningGroup`].
#[derive(Clone, Copy, Debug)]
pub struct TurningPath {
    pub id: TurningPathId,
    pub group: TurningGroupId,
    pub connector: ConnectorId,
}

/// A pair of turning paths whose swept areas intersect and therefore cannot
/// both hold green simultaneously.
#[derive(Clone, Copy, Debug)]
pub struct TurningConflict {
    pub id: TurningConflictId,
    pub a: TurningPathId,
    pub b: TurningPathId,
}

/// A pedestrian crossing at a node.
#[derive(Clone, Copy, Debug)]
pub struct Crossing {
    pub id: CrossingId,
    pub node: NodeId,
}

/// A bus stop along a segment.
#[derive(Clone, Copy, Debug)]
pub struct BusStop {
    pub id: BusStopId,
    pub segment: SegmentId,
    /// Distance in centimetres from the segment's start node.
    pub dist_on_segment_cm: i64,
}

/// The sealed ("frozen", spec.md §5) collection of road furniture that sits
/// alongside [`crate::RoadNetwork`]'s routing graph. Built via
/// [`RoadTopologyBuilder`]; read-only once constructed — no locks needed
/// because nothing mutates it after tick 0.
#[derive(Clone, Debug, Default)]
pub struct RoadTopology {
    pub links: Vec<Link>,
    pub segments: Vec<RoadSegment>,
    pub lanes: Vec<Lane>,
    pub connectors: Vec<LaneConnector>,
    pub turning_groups: Vec<TurningGroup>,
    pub turning_paths: Vec<TurningPath>,
    pub turning_conflicts: Vec<TurningConflict>,
    pub crossings: Vec<Crossing>,
    pub bus_stops: Vec<BusStop>,
    /// Elements skipped at seal time due to a network-consistency error
    /// (spec.md §7) — dangling ids, non-planar crossings, missing turnings.
    pub skipped_count: usize,
}

impl RoadTopology {
    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id.index())
    }

    pub fn segment(&self, id: SegmentId) -> Option<&RoadSegment> {
        self.segments.get(id.index())
    }

    pub fn lane_ref_rules(&self, lane_ref: LaneRef) -> Option<LaneRules> {
        self.segment(lane_ref.segment)?
            .lanes
            .iter()
            .find(|&&l| l == lane_ref.lane)?;
        self.lane(lane_ref.lane).map(|l| l.rules)
    }

    /// Resolve the `TurningGroupId` that grants right-of-way to the
    /// `(from_lane, to_lane)` movement, if any (spec.md §4.I:
    /// `getDriverLight(fromLane, toLane)`). Walks the sealed
    /// `LaneConnector` → `TurningPath` → `TurningGroup` chain: finds the
    /// connector matching the pair, then the turning path referencing that
    /// connector, then that path's group.
    pub fn turning_group_for_lanes(&self, from_lane: LaneRef, to_lane: LaneRef) -> Option<TurningGroupId> {
        let connector = self
            .connectors
            .iter()
            .find(|c| c.from == from_lane && c.to == to_lane)?;
        let path = self.turning_paths.iter().find(|p| p.connector == connector.id)?;
        Some(path.group)
    }
}

/// Incrementally build a [`RoadTopology`], validating referential integrity
/// at `build()` time.
#[derive(Default)]
pub struct RoadTopologyBuilder {
    topology: RoadTopology,
}

impl RoadTopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_link(&mut self, from_node: NodeId, to_node: NodeId) -> LinkId {
        let id = LinkId(self.topology.links.len() as u32);
        self.topology.links.push(Link { id, from_node, to_node, segments: Vec::new() });
        id
    }

    pub fn add_segment(
        &mut self,
        link: LinkId,
        from_node: NodeId,
        to_node: NodeId,
        length_cm: i64,
    ) -> SegmentId {
        let id = SegmentId(self.topology.segments.len() as u32);
        self.topology.segments.push(RoadSegment {
            id,
            link,
            from_node,
            to_node,
            length_cm,
            lanes: Vec::new(),
        });
        if let Some(l) = self.topology.links.get_mut(link.index()) {
            l.segments.push(id);
        }
        id
    }

    pub fn add_lane(&mut self, segment: SegmentId, width_cm: u32, rules: LaneRules) -> LaneId {
        let seg = match self.topology.segments.get(segment.index()) {
            Some(s) => s,
            None => {
                self.topology.skipped_count += 1;
                return LaneId::INVALID;
            }
        };
        let id = LaneId(seg.lanes.len() as u16);
        self.topology.lanes.push(Lane { id, segment, width_cm, rules });
        self.topology.segments[segment.index()].lanes.push(id);
        id
    }

    pub fn add_connector(&mut self, from: LaneRef, to: LaneRef) -> ConnectorId {
        let id = ConnectorId(self.topology.connectors.len() as u32);
        self.topology.connectors.push(LaneConnector { id, from, to });
        id
    }

    pub fn add_turning_group(
        &mut self,
        node: NodeId,
        from_segment: SegmentId,
        to_segment: SegmentId,
    ) -> TurningGroupId {
        let id = TurningGroupId(self.topology.turning_groups.len() as u32);
        self.topology.turning_groups.push(TurningGroup {
            id,
            node,
            from_segment,
            to_segment,
            paths: Vec::new(),
        });
        id
    }

    pub fn add_turning_path(&mut self, group: TurningGroupId, connector: ConnectorId) -> TurningPathId {
        let id = TurningPathId(self.topology.turning_paths.len() as u32);
        self.topology.turning_paths.push(TurningPath { id, group, connector });
        if let Some(g) = self.topology.turning_groups.get_mut(group.index()) {
            g.paths.push(id);
        } else {
            self.topology.skipped_count += 1;
        }
        id
    }

    pub fn add_turning_conflict(&mut self, a: TurningPathId, b: TurningPathId) -> TurningConflictId {
        let id = TurningConflictId(self.topology.turning_conflicts.len() as u32);
        self.topology.turning_conflicts.push(TurningConflict { id, a, b });
        id
    }

    pub fn add_crossing(&mut self, node: NodeId) -> CrossingId {
        let id = CrossingId(self.topology.crossings.len() as u32);
        self.topology.crossings.push(Crossing { id, node });
        id
    }

    pub fn add_bus_stop(&mut self, segment: SegmentId, dist_on_segment_cm: i64) -> BusStopId {
        let seg_exists = self.topology.segments.get(segment.index()).is_some();
        if !seg_exists {
            self.topology.skipped_count += 1;
            return BusStopId::INVALID;
        }
        let id = BusStopId(self.topology.bus_stops.len() as u32);
        self.topology.bus_stops.push(BusStop { id, segment, dist_on_segment_cm });
        id
    }

    /// Seal the topology. Dangling references recorded via the `add_*`
    /// helpers above are already skipped and counted; this pass additionally
    /// drops turning conflicts that reference a missing turning path.
    pub fn build(mut self) -> RoadTopology {
        let valid_paths: std::collections::HashSet<TurningPathId> =
            self.topology.turning_paths.iter().map(|p| p.id).collect();
        let before = self.topology.turning_conflicts.len();
        self.topology
            .turning_conflicts
            .retain(|c| valid_paths.contains(&c.a) && valid_paths.contains(&c.b));
        self.topology.skipped_count += before - self.topology.turning_conflicts.len();
        self.topology
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_rules_bits_are_stable() {
        assert_eq!(LaneRules::IS_VEHICLE.0, 1);
        assert_eq!(LaneRules::CAN_GO_STRAIGHT.0, 1 << 5);
        assert_eq!(LaneRules::U_TURN_ALLOWED.0, 1 << 13);
    }

    #[test]
    fn lane_rules_combine() {
        let r = LaneRules::IS_VEHICLE.with(LaneRules::CAN_GO_STRAIGHT);
        assert!(r.has(LaneRules::IS_VEHICLE));
        assert!(r.has(LaneRules::CAN_GO_STRAIGHT));
        assert!(!r.has(LaneRules::CAN_GO_LEFT));
    }

    #[test]
    fn topology_build_counts_dangling_lane() {
        let mut b = RoadTopologyBuilder::new();
        b.add_lane(SegmentId(99), 350, LaneRules::IS_VEHICLE);
        let topo = b.build();
        assert_eq!(topo.skipped_count, 1);
        assert!(topo.lanes.is_empty());
    }

    #[test]
    fn topology_seal_drops_dangling_conflict() {
        let mut b = RoadTopologyBuilder::new();
        let link = b.add_link(NodeId(0), NodeId(1));
        let seg = b.add_segment(link, NodeId(0), NodeId(1), 10_000);
        let lane_a = b.add_lane(seg, 350, LaneRules::IS_VEHICLE);
        let lane_b = b.add_lane(seg, 350, LaneRules::IS_VEHICLE);
        let conn = b.add_connector(LaneRef::new(seg, lane_a), LaneRef::new(seg, lane_b));
        let group = b.add_turning_group(NodeId(1), seg, seg);
        let path = b.add_turning_path(group, conn);
        b.add_turning_conflict(path, TurningPathId(999));
        let topo = b.build();
        assert!(topo.turning_conflicts.is_empty());
        assert_eq!(topo.skipped_count, 1);
    }
}
