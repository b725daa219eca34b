//! The per-tick, per-entity output record: `(kind, frame, id, {key:value,
//! …})`. Every writer in this crate — text, CSV, SQLite, Parquet — serializes
//! the same `EventRecord` shape.

use std::fmt;

use tk_core::{AgentId, LaneRef, Point2d};
use tk_spatial::RoadTopology;

/// The fixed set of record kinds the core emits (spec.md §6). Application
/// code building on `tk-sim` may emit additional kinds (e.g. behavioral
/// models' own diagnostics) — those aren't part of the core's contract, so
/// they aren't represented here.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EventKind {
    /// Emitted once, at the very start, with `frame-time-ms`.
    Simulation,
    Node,
    Link,
    Segment,
    Lane,
    LaneConnector,
    TurningGroup,
    TurningPath,
    Conflict,
    BusStop,
    /// Per-tick, one per moving (spatial) entity.
    Agent,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Simulation => "simulation",
            EventKind::Node => "node",
            EventKind::Link => "link",
            EventKind::Segment => "segment",
            EventKind::Lane => "lane",
            EventKind::LaneConnector => "lane-connector",
            EventKind::TurningGroup => "turning-group",
            EventKind::TurningPath => "turning-path",
            EventKind::Conflict => "conflict",
            EventKind::BusStop => "bus-stop",
            EventKind::Agent => "agent",
        };
        f.write_str(s)
    }
}

/// One output line: `kind,frame,id,key:value,key:value,…`.
///
/// `frame` is the tick number the record was emitted at; static network rows
/// (everything but `Agent`) use frame `0` since they're emitted once, right
/// after sealing, before tick 0's update phase runs.
#[derive(Clone, Debug)]
pub struct EventRecord {
    pub kind: EventKind,
    pub frame: u64,
    pub id: u64,
    pub fields: Vec<(&'static str, String)>,
}

impl EventRecord {
    pub fn new(kind: EventKind, frame: u64, id: u64) -> Self {
        Self { kind, frame, id, fields: Vec::new() }
    }

    pub fn with(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    /// `fields` joined as `key:value;key:value;…`, for backends that store
    /// `(kind, frame, id)` in separate columns and the field list in one.
    pub fn fields_joined(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.kind, self.frame, self.id)?;
        for (key, value) in &self.fields {
            write!(f, ",{key}:{value}")?;
        }
        Ok(())
    }
}

/// The `simulation` record: emitted exactly once, before any static-network
/// row (spec.md §6).
pub fn simulation_record(tick_duration_millis: u32) -> EventRecord {
    EventRecord::new(EventKind::Simulation, 0, 0).with("frame-time-ms", tick_duration_millis)
}

/// A trailing marker line closing the static-network section (spec.md §6).
/// Not an `EventRecord` — it carries no kind/frame/id triple, just the bare
/// token a downstream reader scans for.
pub const ROADNETWORK_DONE: &str = "ROADNETWORK_DONE";

/// Every static-network row, once, in the order spec.md §6 lists them:
/// node, link, segment, lane, lane-connector, turning-group, turning-path,
/// conflict, bus-stop. `node_count` comes from the routing graph
/// (`RoadNetwork::node_pos.len()`) since `RoadTopology` itself doesn't model
/// nodes — only the furniture hung off them.
pub fn network_records(topology: &RoadTopology, node_count: usize) -> Vec<EventRecord> {
    let mut records = Vec::with_capacity(
        node_count
            + topology.links.len()
            + topology.segments.len()
            + topology.lanes.len()
            + topology.connectors.len()
            + topology.turning_groups.len()
            + topology.turning_paths.len()
            + topology.turning_conflicts.len()
            + topology.bus_stops.len(),
    );

    for node_idx in 0..node_count {
        records.push(EventRecord::new(EventKind::Node, 0, node_idx as u64));
    }
    for link in &topology.links {
        records.push(
            EventRecord::new(EventKind::Link, 0, link.id.0 as u64)
                .with("from", link.from_node.0)
                .with("to", link.to_node.0)
                .with("segments", link.segments.len()),
        );
    }
    for seg in &topology.segments {
        records.push(
            EventRecord::new(EventKind::Segment, 0, seg.id.0 as u64)
                .with("link", seg.link.0)
                .with("from", seg.from_node.0)
                .with("to", seg.to_node.0)
                .with("length-cm", seg.length_cm)
                .with("lanes", seg.lanes.len()),
        );
    }
    for lane in &topology.lanes {
        records.push(
            EventRecord::new(EventKind::Lane, 0, lane.id.0 as u64)
                .with("segment", lane.segment.0)
                .with("width-cm", lane.width_cm)
                .with("rules", lane.rules.0),
        );
    }
    for conn in &topology.connectors {
        records.push(
            EventRecord::new(EventKind::LaneConnector, 0, conn.id.0 as u64)
                .with("from-segment", conn.from.segment.0)
                .with("from-lane", conn.from.lane.0)
                .with("to-segment", conn.to.segment.0)
                .with("to-lane", conn.to.lane.0),
        );
    }
    for group in &topology.turning_groups {
        records.push(
            EventRecord::new(EventKind::TurningGroup, 0, group.id.0 as u64)
                .with("node", group.node.0)
                .with("from-segment", group.from_segment.0)
                .with("to-segment", group.to_segment.0)
                .with("paths", group.paths.len()),
        );
    }
    for path in &topology.turning_paths {
        records.push(
            EventRecord::new(EventKind::TurningPath, 0, path.id.0 as u64)
                .with("group", path.group.0)
                .with("connector", path.connector.0),
        );
    }
    for conflict in &topology.turning_conflicts {
        records.push(
            EventRecord::new(EventKind::Conflict, 0, conflict.id.0 as u64)
                .with("a", conflict.a.0)
                .with("b", conflict.b.0),
        );
    }
    for stop in &topology.bus_stops {
        records.push(
            EventRecord::new(EventKind::BusStop, 0, stop.id.0 as u64)
                .with("segment", stop.segment.0)
                .with("dist-on-segment-cm", stop.dist_on_segment_cm),
        );
    }

    records
}

/// Per-tick rows for every moving entity (spec.md §6): position, role, lane.
/// `snapshot` is `tk_sim::Kernel::agent_snapshot()`'s return value — kept
/// generic over a slice rather than depending on `tk-sim` directly in this
/// module's signature, so the conversion stays a pure function of plain data.
pub fn agent_records(
    frame: u64,
    snapshot: &[(AgentId, Point2d, LaneRef, &'static str)],
) -> Vec<EventRecord> {
    snapshot
        .iter()
        .map(|(id, pos, lane, role)| {
            EventRecord::new(EventKind::Agent, frame, id.0 as u64)
                .with("x", pos.x_cm)
                .with("y", pos.y_cm)
                .with("role", *role)
                .with("lane", *lane)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tk_core::{LaneId, SegmentId};
    use tk_spatial::RoadTopologyBuilder;

    #[test]
    fn simulation_record_formats_as_expected() {
        let rec = simulation_record(100);
        assert_eq!(rec.to_string(), "simulation,0,0,frame-time-ms:100");
    }

    #[test]
    fn network_records_cover_every_kind_once() {
        let mut b = RoadTopologyBuilder::new();
        let link = b.add_link(tk_core::NodeId(0), tk_core::NodeId(1));
        let seg = b.add_segment(link, tk_core::NodeId(0), tk_core::NodeId(1), 1000);
        b.add_lane(seg, 350, tk_spatial::LaneRules::IS_VEHICLE);
        b.add_bus_stop(seg, 200);
        let topo = b.build();

        let records = network_records(&topo, 2);
        let kinds: Vec<_> = records.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&EventKind::Node));
        assert!(kinds.contains(&EventKind::Link));
        assert!(kinds.contains(&EventKind::Segment));
        assert!(kinds.contains(&EventKind::Lane));
        assert!(kinds.contains(&EventKind::BusStop));
        assert_eq!(records.iter().filter(|r| r.kind == EventKind::Node).count(), 2);
    }

    #[test]
    fn agent_record_line_has_expected_fields() {
        let lane = LaneRef::new(SegmentId(3), LaneId(1));
        let snapshot = vec![(AgentId(7), Point2d::new(100, 200), lane, "driver")];
        let records = agent_records(42, &snapshot);
        assert_eq!(records.len(), 1);
        let line = records[0].to_string();
        assert!(line.starts_with("agent,42,7,"));
        assert!(line.contains("role:driver"));
    }
}
