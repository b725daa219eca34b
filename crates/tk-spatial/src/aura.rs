//! The Aura manager (spec.md §4.H): range/nearest-neighbor queries over
//! agent positions, rebuilt once per tick from the *current* (post-flip)
//! position snapshot. Three interchangeable backends share one trait.
//!
//! # Consistency with double buffering
//!
//! `AuraManager::rebuild` takes a plain snapshot (`&[(AgentId, Point2d,
//! LaneRef)]`) rather than borrowing `AgentStore` directly, so the spatial
//! index never observes a `pending` write — callers must collect the
//! snapshot from `SyncBufferedCell::get()` values after the flip phase, never
//! during update. Queries return owned `Vec`s (snapshots), so their contents
//! stay valid until the next rebuild even if the underlying index mutates
//! concurrently with a reader that started just before rebuild (the
//! `WorkGroup` barrier prevents this in practice; the owned-`Vec` contract
//! is what the spec calls out explicitly in §4.H).

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use tk_core::{AgentId, LaneRef, Point2d};

/// One agent's position as seen by the aura at the start of a tick.
#[derive(Clone, Copy, Debug)]
pub struct AuraEntry {
    pub agent: AgentId,
    pub position: Point2d,
    pub lane: LaneRef,
    /// Progress along `lane`'s segment, centimetres from the segment start —
    /// used by `nearest_agent_on_lane` to order same-lane agents without a
    /// second distance computation.
    pub dist_on_segment_cm: i64,
}

/// A filter predicate for [`AuraManager::nearest_agents`].
pub type AgentFilter<'a> = &'a dyn Fn(&AuraEntry) -> bool;

/// Shared contract for every aura backend (spec.md §4.H).
///
/// Implementations must refresh only during the dedicated rebuild phase and
/// must never be queried while `rebuild` is in progress — enforced by the
/// `WorkGroup`'s phase barrier, not by a lock inside the index (rebuild is
/// single-writer by construction: only the group-driving thread calls it).
pub trait AuraManager: Send + Sync {
    /// Discard the old index and build a fresh one from `entries`.
    fn rebuild(&mut self, entries: Vec<AuraEntry>);

    /// All agents whose position falls within the axis-aligned rectangle
    /// `(x1, y1) .. (x2, y2)` (centimetres, inclusive).
    fn agents_in_rect(&self, x1: i64, y1: i64, x2: i64, y2: i64) -> Vec<AuraEntry>;

    /// Agents within `radius_cm` of `point`, passing `filter`, nearest first.
    fn nearest_agents(&self, point: Point2d, radius_cm: i64, filter: AgentFilter<'_>) -> Vec<AuraEntry>;

    /// The nearest agent on `lane` to `position_along_cm`, optionally
    /// restricted to agents ahead (`direction > 0`) or behind (`direction <
    /// 0`) the query point; `direction == 0` considers both.
    fn nearest_agent_on_lane(
        &self,
        lane: LaneRef,
        position_along_cm: i64,
        direction: i32,
    ) -> Option<AuraEntry>;

    /// Number of agents indexed as of the last rebuild.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Grid-bucket backend ─────────────────────────────────────────────────────────

/// Uniform bucket-grid backend. O(1) amortized insert/rebuild, O(k) range
/// query where k = agents in the swept buckets. Good default for
/// roughly-uniform agent density.
pub struct GridAura {
    cell_size_cm: i64,
    buckets: std::collections::HashMap<(i64, i64), Vec<AuraEntry>>,
    entries: Vec<AuraEntry>,
}

impl GridAura {
    pub fn new(cell_size_cm: i64) -> Self {
        assert!(cell_size_cm > 0, "cell_size_cm must be positive");
        Self { cell_size_cm, buckets: Default::default(), entries: Vec::new() }
    }

    #[inline]
    fn cell_of(&self, p: Point2d) -> (i64, i64) {
        (p.x_cm.div_euclid(self.cell_size_cm), p.y_cm.div_euclid(self.cell_size_cm))
    }
}

impl AuraManager for GridAura {
    fn rebuild(&mut self, entries: Vec<AuraEntry>) {
        self.buckets.clear();
        for e in &entries {
            let cell = self.cell_of(e.position);
            self.buckets.entry(cell).or_default().push(*e);
        }
        self.entries = entries;
    }

    fn agents_in_rect(&self, x1: i64, y1: i64, x2: i64, y2: i64) -> Vec<AuraEntry> {
        let (lo_x, hi_x) = (x1.min(x2), x1.max(x2));
        let (lo_y, hi_y) = (y1.min(y2), y1.max(y2));
        let (cx1, cy1) = (lo_x.div_euclid(self.cell_size_cm), lo_y.div_euclid(self.cell_size_cm));
        let (cx2, cy2) = (hi_x.div_euclid(self.cell_size_cm), hi_y.div_euclid(self.cell_size_cm));
        let mut out = Vec::new();
        for cx in cx1..=cx2 {
            for cy in cy1..=cy2 {
                if let Some(bucket) = self.buckets.get(&(cx, cy)) {
                    out.extend(bucket.iter().filter(|e| {
                        e.position.x_cm >= lo_x
                            && e.position.x_cm <= hi_x
                            && e.position.y_cm >= lo_y
                            && e.position.y_cm <= hi_y
                    }));
                }
            }
        }
        out
    }

    fn nearest_agents(&self, point: Point2d, radius_cm: i64, filter: AgentFilter<'_>) -> Vec<AuraEntry> {
        let mut out: Vec<(i64, AuraEntry)> = self
            .agents_in_rect(
                point.x_cm - radius_cm,
                point.y_cm - radius_cm,
                point.x_cm + radius_cm,
                point.y_cm + radius_cm,
            )
            .into_iter()
            .filter(|e| filter(e))
            .map(|e| (e.position.distance_sq_cm(point), e))
            .filter(|(d2, _)| *d2 <= radius_cm * radius_cm)
            .collect();
        out.sort_unstable_by_key(|(d2, _)| *d2);
        out.into_iter().map(|(_, e)| e).collect()
    }

    fn nearest_agent_on_lane(&self, lane: LaneRef, position_along_cm: i64, direction: i32) -> Option<AuraEntry> {
        nearest_on_lane(&self.entries, lane, position_along_cm, direction)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ── R*-tree backend ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct RTreeEntry(AuraEntry);

impl RTreeObject for RTreeEntry {
    type Envelope = AABB<[i64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.0.position.x_cm, self.0.position.y_cm])
    }
}

impl PointDistance for RTreeEntry {
    fn distance_2(&self, point: &[i64; 2]) -> i64 {
        let dx = self.0.position.x_cm - point[0];
        let dy = self.0.position.y_cm - point[1];
        dx * dx + dy * dy
    }
}

/// `rstar`-backed spatial index. Best for highly non-uniform densities where
/// a fixed grid cell size would be either too coarse or too wasteful.
#[derive(Default)]
pub struct RTreeAura {
    tree: RTree<RTreeEntry>,
    entries: Vec<AuraEntry>,
}

impl RTreeAura {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuraManager for RTreeAura {
    fn rebuild(&mut self, entries: Vec<AuraEntry>) {
        self.tree = RTree::bulk_load(entries.iter().map(|e| RTreeEntry(*e)).collect());
        self.entries = entries;
    }

    fn agents_in_rect(&self, x1: i64, y1: i64, x2: i64, y2: i64) -> Vec<AuraEntry> {
        let envelope = AABB::from_corners([x1.min(x2), y1.min(y2)], [x1.max(x2), y1.max(y2)]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|e| e.0)
            .collect()
    }

    fn nearest_agents(&self, point: Point2d, radius_cm: i64, filter: AgentFilter<'_>) -> Vec<AuraEntry> {
        let r2 = radius_cm * radius_cm;
        let mut out: Vec<(i64, AuraEntry)> = self
            .tree
            .nearest_neighbor_iter_with_distance_2(&[point.x_cm, point.y_cm])
            .take_while(|(_, d2)| *d2 <= r2)
            .map(|(e, d2)| (d2, e.0))
            .filter(|(_, e)| filter(e))
            .collect();
        out.sort_unstable_by_key(|(d2, _)| *d2);
        out.into_iter().map(|(_, e)| e).collect()
    }

    fn nearest_agent_on_lane(&self, lane: LaneRef, position_along_cm: i64, direction: i32) -> Option<AuraEntry> {
        nearest_on_lane(&self.entries, lane, position_along_cm, direction)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ── "SimTree" backend ───────────────────────────────────────────────────────────

/// A static, rebuild-from-scratch-every-tick KD-style partition tree — the
/// spec's "custom partition tree" backend. Splits recursively on the widest
/// axis, rebuilding the whole structure each tick (cheap relative to an
/// incremental tree, since the index must be rebuilt every tick regardless
/// once positions flip).
pub struct SimTreeAura {
    leaf_capacity: usize,
    root: Option<Box<SimTreeNode>>,
    entries: Vec<AuraEntry>,
}

enum SimTreeNode {
    Leaf(Vec<AuraEntry>),
    Split {
        axis_is_x: bool,
        threshold: i64,
        lo: Box<SimTreeNode>,
        hi: Box<SimTreeNode>,
    },
}

impl SimTreeAura {
    pub fn new(leaf_capacity: usize) -> Self {
        Self { leaf_capacity: leaf_capacity.max(1), root: None, entries: Vec::new() }
    }

    fn build_node(leaf_capacity: usize, mut entries: Vec<AuraEntry>) -> SimTreeNode {
        if entries.len() <= leaf_capacity {
            return SimTreeNode::Leaf(entries);
        }
        let (min_x, max_x, min_y, max_y) = entries.iter().fold(
            (i64::MAX, i64::MIN, i64::MAX, i64::MIN),
            |(mnx, mxx, mny, mxy), e| {
                (mnx.min(e.position.x_cm), mxx.max(e.position.x_cm), mny.min(e.position.y_cm), mxy.max(e.position.y_cm))
            },
        );
        let axis_is_x = (max_x - min_x) >= (max_y - min_y);
        if axis_is_x {
            entries.sort_unstable_by_key(|e| e.position.x_cm);
        } else {
            entries.sort_unstable_by_key(|e| e.position.y_cm);
        }
        let mid = entries.len() / 2;
        let threshold = if axis_is_x {
            entries[mid].position.x_cm
        } else {
            entries[mid].position.y_cm
        };
        let hi_half = entries.split_off(mid);
        SimTreeNode::Split {
            axis_is_x,
            threshold,
            lo: Box::new(Self::build_node(leaf_capacity, entries)),
            hi: Box::new(Self::build_node(leaf_capacity, hi_half)),
        }
    }

    fn collect_rect(node: &SimTreeNode, x1: i64, y1: i64, x2: i64, y2: i64, out: &mut Vec<AuraEntry>) {
        match node {
            SimTreeNode::Leaf(entries) => out.extend(
                entries
                    .iter()
                    .filter(|e| e.position.x_cm >= x1 && e.position.x_cm <= x2 && e.position.y_cm >= y1 && e.position.y_cm <= y2),
            ),
            SimTreeNode::Split { axis_is_x, threshold, lo, hi } => {
                let (q_lo, q_hi) = if *axis_is_x { (x1, x2) } else { (y1, y2) };
                if q_lo <= *threshold {
                    Self::collect_rect(lo, x1, y1, x2, y2, out);
                }
                if q_hi >= *threshold {
                    Self::collect_rect(hi, x1, y1, x2, y2, out);
                }
            }
        }
    }
}

impl AuraManager for SimTreeAura {
    fn rebuild(&mut self, entries: Vec<AuraEntry>) {
        self.entries = entries.clone();
        self.root = if entries.is_empty() {
            None
        } else {
            Some(Box::new(Self::build_node(self.leaf_capacity, entries)))
        };
    }

    fn agents_in_rect(&self, x1: i64, y1: i64, x2: i64, y2: i64) -> Vec<AuraEntry> {
        let (lo_x, hi_x) = (x1.min(x2), x1.max(x2));
        let (lo_y, hi_y) = (y1.min(y2), y1.max(y2));
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            Self::collect_rect(root, lo_x, lo_y, hi_x, hi_y, &mut out);
        }
        out
    }

    fn nearest_agents(&self, point: Point2d, radius_cm: i64, filter: AgentFilter<'_>) -> Vec<AuraEntry> {
        let mut out: Vec<(i64, AuraEntry)> = self
            .agents_in_rect(point.x_cm - radius_cm, point.y_cm - radius_cm, point.x_cm + radius_cm, point.y_cm + radius_cm)
            .into_iter()
            .filter(|e| filter(e))
            .map(|e| (e.position.distance_sq_cm(point), e))
            .filter(|(d2, _)| *d2 <= radius_cm * radius_cm)
            .collect();
        out.sort_unstable_by_key(|(d2, _)| *d2);
        out.into_iter().map(|(_, e)| e).collect()
    }

    fn nearest_agent_on_lane(&self, lane: LaneRef, position_along_cm: i64, direction: i32) -> Option<AuraEntry> {
        nearest_on_lane(&self.entries, lane, position_along_cm, direction)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ── Shared helper ────────────────────────────────────────────────────────────────

/// Linear scan restricted to one lane — lanes hold at most a few dozen
/// agents at once, so this is cheaper than building a per-lane index.
fn nearest_on_lane(
    entries: &[AuraEntry],
    lane: LaneRef,
    position_along_cm: i64,
    direction: i32,
) -> Option<AuraEntry> {
    entries
        .iter()
        .filter(|e| e.lane == lane)
        .filter(|e| match direction.cmp(&0) {
            std::cmp::Ordering::Greater => e.dist_on_segment_cm > position_along_cm,
            std::cmp::Ordering::Less => e.dist_on_segment_cm < position_along_cm,
            std::cmp::Ordering::Equal => true,
        })
        .min_by_key(|e| (e.dist_on_segment_cm - position_along_cm).abs())
        .copied()
}

/// Backend selection for [`AuraManager`], mirroring spec.md §4.H's "selected
/// at init" language. Consumed by application setup code to construct the
/// right boxed backend.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuraBackend {
    #[default]
    Grid,
    RTree,
    SimTree,
}

impl AuraBackend {
    /// Construct the corresponding boxed backend with reasonable defaults.
    pub fn build(self) -> Box<dyn AuraManager> {
        match self {
            AuraBackend::Grid => Box::new(GridAura::new(5_000)), // 50 m cells
            AuraBackend::RTree => Box::new(RTreeAura::new()),
            AuraBackend::SimTree => Box::new(SimTreeAura::new(16)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, x: i64, y: i64) -> AuraEntry {
        AuraEntry {
            agent: AgentId(id),
            position: Point2d::new(x, y),
            lane: LaneRef::default(),
            dist_on_segment_cm: 0,
        }
    }

    fn exercise_backend(mut backend: Box<dyn AuraManager>) {
        backend.rebuild(vec![entry(0, 0, 0), entry(1, 100, 0), entry(2, 10_000, 10_000)]);
        assert_eq!(backend.len(), 3);

        let rect = backend.agents_in_rect(-10, -10, 200, 200);
        assert_eq!(rect.len(), 2);

        let near = backend.nearest_agents(Point2d::new(0, 0), 50, &|_| true);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].agent, AgentId(0));

        let near2 = backend.nearest_agents(Point2d::new(0, 0), 1_000, &|e| e.agent != AgentId(0));
        assert_eq!(near2.len(), 1);
        assert_eq!(near2[0].agent, AgentId(1));
    }

    #[test]
    fn grid_backend_matches_contract() {
        exercise_backend(Box::new(GridAura::new(500)));
    }

    #[test]
    fn rtree_backend_matches_contract() {
        exercise_backend(Box::new(RTreeAura::new()));
    }

    #[test]
    fn simtree_backend_matches_contract() {
        exercise_backend(Box::new(SimTreeAura::new(2)));
    }

    #[test]
    fn nearest_agent_on_lane_respects_direction() {
        let seg = tk_core::SegmentId(0);
        let lane = LaneRef::new(seg, tk_core::LaneId(0));
        let entries = vec![
            AuraEntry { agent: AgentId(0), position: Point2d::ORIGIN, lane, dist_on_segment_cm: 100 },
            AuraEntry { agent: AgentId(1), position: Point2d::ORIGIN, lane, dist_on_segment_cm: 500 },
        ];
        let ahead = nearest_on_lane(&entries, lane, 200, 1);
        assert_eq!(ahead.unwrap().agent, AgentId(1));
        let behind = nearest_on_lane(&entries, lane, 200, -1);
        assert_eq!(behind.unwrap().agent, AgentId(0));
    }
}
