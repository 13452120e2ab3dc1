//! Reeb graph skeleton produced by the sweep.
//!
//! Nodes sit on critical vertices; arcs run from the node where a contour
//! component is born (or emerges from a saddle) to the node where it dies or
//! meets a saddle. Arc endpoints are stored in sweep orientation: `down` is
//! reached first by the sweep. Regular vertices are recorded on the arc whose
//! contour swept over them, which gives the segmentation of the mesh.
//!
//! Propagations write to the skeleton concurrently through [`SkeletonSink`].

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::reeb_error::ReebError;
use crate::topology::scalars::SweepDirection;

const NO_ARC: usize = usize::MAX;
const NO_NODE: usize = usize::MAX;

/// Index of a skeleton node.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

/// Index of a skeleton arc.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArcId(usize);

impl NodeId {
    #[inline]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl ArcId {
    #[inline]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for ArcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Write side of the skeleton, shared by all propagations.
pub trait SkeletonSink: Sync {
    /// Record a critical vertex.
    fn new_node(&self, vertex: usize) -> NodeId;
    /// Open an arc leaving `from`.
    fn new_arc(&self, from: NodeId) -> ArcId;
    /// Terminate `arc` at `to`.
    fn close_arc(&self, arc: ArcId, to: NodeId);
    /// Attribute a regular vertex to `arc`.
    fn extend_arc(&self, arc: ArcId, vertex: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReebNode {
    pub vertex: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReebArc {
    pub down: NodeId,
    /// `None` while the arc is still open.
    pub up: Option<NodeId>,
}

/// Classification of a node by its scalar-value neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Minimum,
    Maximum,
    /// Several components below merge into one above.
    JoinSaddle,
    /// One component below splits into several above.
    SplitSaddle,
    /// Several components merge and split at the same vertex, or a node of
    /// degree two.
    Degenerate,
    /// A vertex without any arc.
    Isolated,
}

/// Serializable copy of a finished skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReebGraphSnapshot {
    pub direction: SweepDirection,
    pub nodes: Vec<ReebNode>,
    pub arcs: Vec<ReebArc>,
    /// Arc of every regular vertex, `None` on critical vertices.
    pub segmentation: Vec<Option<ArcId>>,
}

/// Concurrent Reeb graph skeleton.
pub struct ReebGraph {
    direction: SweepDirection,
    nodes: Mutex<Vec<ReebNode>>,
    arcs: Mutex<Vec<ReebArc>>,
    vertex_arc: Vec<AtomicUsize>,
    vertex_node: Vec<AtomicUsize>,
}

impl ReebGraph {
    /// Empty skeleton over a mesh with `vertex_count` vertices.
    pub fn new(vertex_count: usize, direction: SweepDirection) -> Self {
        Self {
            direction,
            nodes: Mutex::new(Vec::new()),
            arcs: Mutex::new(Vec::new()),
            vertex_arc: (0..vertex_count).map(|_| AtomicUsize::new(NO_ARC)).collect(),
            vertex_node: (0..vertex_count).map(|_| AtomicUsize::new(NO_NODE)).collect(),
        }
    }

    pub fn direction(&self) -> SweepDirection {
        self.direction
    }

    pub fn node_count(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.lock().len()
    }

    pub fn node(&self, id: NodeId) -> ReebNode {
        self.nodes.lock()[id.0]
    }

    pub fn arc(&self, id: ArcId) -> ReebArc {
        self.arcs.lock()[id.0]
    }

    pub fn nodes(&self) -> Vec<ReebNode> {
        self.nodes.lock().clone()
    }

    pub fn arcs(&self) -> Vec<ReebArc> {
        self.arcs.lock().clone()
    }

    /// Node placed on `vertex`, if the vertex is critical.
    pub fn node_at_vertex(&self, vertex: usize) -> Option<NodeId> {
        match self.vertex_node[vertex].load(Ordering::Acquire) {
            NO_NODE => None,
            n => Some(NodeId(n)),
        }
    }

    /// Arcs entering `node` from below in sweep order.
    pub fn down_degree(&self, node: NodeId) -> usize {
        self.arcs
            .lock()
            .iter()
            .filter(|a| a.up == Some(node))
            .count()
    }

    /// Arcs leaving `node` upwards in sweep order.
    pub fn up_degree(&self, node: NodeId) -> usize {
        self.arcs.lock().iter().filter(|a| a.down == node).count()
    }

    /// `(down, up)` degree of every node, in one pass over the arcs.
    pub fn degrees(&self) -> Vec<(usize, usize)> {
        let mut degrees = vec![(0, 0); self.node_count()];
        for arc in self.arcs.lock().iter() {
            degrees[arc.down.0].1 += 1;
            if let Some(up) = arc.up {
                degrees[up.0].0 += 1;
            }
        }
        degrees
    }

    /// Classify `node` in scalar terms, whatever the sweep direction was.
    pub fn node_kind(&self, node: NodeId) -> NodeKind {
        self.kind_from_degrees(self.down_degree(node), self.up_degree(node))
    }

    fn kind_from_degrees(&self, down: usize, up: usize) -> NodeKind {
        let ascending = self.direction == SweepDirection::Ascending;
        match (down, up) {
            (0, 0) => NodeKind::Isolated,
            (0, _) if ascending => NodeKind::Minimum,
            (0, _) => NodeKind::Maximum,
            (_, 0) if ascending => NodeKind::Maximum,
            (_, 0) => NodeKind::Minimum,
            (d, 1) if d > 1 && ascending => NodeKind::JoinSaddle,
            (d, 1) if d > 1 => NodeKind::SplitSaddle,
            (1, u) if u > 1 && ascending => NodeKind::SplitSaddle,
            (1, u) if u > 1 => NodeKind::JoinSaddle,
            _ => NodeKind::Degenerate,
        }
    }

    /// Number of nodes of each kind, in [`NodeKind`] declaration order.
    pub fn kind_histogram(&self) -> [usize; 6] {
        let mut counts = [0usize; 6];
        for (down, up) in self.degrees() {
            let slot = match self.kind_from_degrees(down, up) {
                NodeKind::Minimum => 0,
                NodeKind::Maximum => 1,
                NodeKind::JoinSaddle => 2,
                NodeKind::SplitSaddle => 3,
                NodeKind::Degenerate => 4,
                NodeKind::Isolated => 5,
            };
            counts[slot] += 1;
        }
        counts
    }

    /// Arc a regular vertex belongs to.
    pub fn vertex_arc(&self, vertex: usize) -> Option<ArcId> {
        match self.vertex_arc[vertex].load(Ordering::Acquire) {
            NO_ARC => None,
            a => Some(ArcId(a)),
        }
    }

    /// Regular vertices swept by `arc`, sorted by id.
    pub fn arc_vertices(&self, arc: ArcId) -> Vec<usize> {
        (0..self.vertex_arc.len())
            .filter(|&v| self.vertex_arc(v) == Some(arc))
            .collect()
    }

    /// Arcs as sorted vertex pairs, independent of ids and sweep direction.
    ///
    /// Two skeletons describe the same graph iff their canonical arcs and
    /// their critical vertex sets are equal.
    pub fn canonical_arcs(&self) -> Vec<(usize, usize)> {
        let nodes = self.nodes.lock();
        let mut pairs: Vec<(usize, usize)> = self
            .arcs
            .lock()
            .iter()
            .filter_map(|a| {
                let lo = nodes[a.down.0].vertex;
                let hi = nodes[a.up?.0].vertex;
                Some(if lo <= hi { (lo, hi) } else { (hi, lo) })
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Critical vertices, sorted.
    pub fn critical_vertices(&self) -> Vec<usize> {
        let mut vs: Vec<usize> = self.nodes.lock().iter().map(|n| n.vertex).collect();
        vs.sort_unstable();
        vs
    }

    pub fn snapshot(&self) -> ReebGraphSnapshot {
        ReebGraphSnapshot {
            direction: self.direction,
            nodes: self.nodes(),
            arcs: self.arcs(),
            segmentation: (0..self.vertex_arc.len())
                .map(|v| self.vertex_arc(v))
                .collect(),
        }
    }
}

impl SkeletonSink for ReebGraph {
    fn new_node(&self, vertex: usize) -> NodeId {
        let mut nodes = self.nodes.lock();
        nodes.push(ReebNode { vertex });
        let id = nodes.len() - 1;
        self.vertex_node[vertex].store(id, Ordering::Release);
        NodeId(id)
    }

    fn new_arc(&self, from: NodeId) -> ArcId {
        let mut arcs = self.arcs.lock();
        arcs.push(ReebArc {
            down: from,
            up: None,
        });
        ArcId(arcs.len() - 1)
    }

    fn close_arc(&self, arc: ArcId, to: NodeId) {
        let mut arcs = self.arcs.lock();
        let slot = &mut arcs[arc.0];
        debug_assert!(slot.up.is_none(), "arc {arc} closed twice");
        slot.up = Some(to);
    }

    fn extend_arc(&self, arc: ArcId, vertex: usize) {
        self.vertex_arc[vertex].store(arc.0, Ordering::Release);
    }
}

impl DebugInvariants for ReebGraph {
    fn validate_invariants(&self) -> Result<(), ReebError> {
        let node_count = self.node_count();
        let arcs = self.arcs();
        for (i, arc) in arcs.iter().enumerate() {
            let Some(up) = arc.up else {
                return Err(ReebError::InvariantViolation(format!("arc a{i} is still open")));
            };
            if arc.down.0 >= node_count || up.0 >= node_count {
                return Err(ReebError::InvariantViolation(format!(
                    "arc a{i} references a missing node"
                )));
            }
            if arc.down == up {
                return Err(ReebError::InvariantViolation(format!("arc a{i} is a self-loop")));
            }
        }
        for v in 0..self.vertex_arc.len() {
            if let Some(a) = self.vertex_arc(v) {
                if a.0 >= arcs.len() {
                    return Err(ReebError::InvariantViolation(format!(
                        "vertex {v} attributed to missing arc {a}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ReebGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.nodes();
        writeln!(
            f,
            "ReebGraph ({:?}): {} nodes, {} arcs",
            self.direction,
            nodes.len(),
            self.arc_count()
        )?;
        for (i, arc) in self.arcs().iter().enumerate() {
            let down = nodes[arc.down.0].vertex;
            match arc.up {
                Some(up) => writeln!(f, "  a{i}: v{down} -> v{}", nodes[up.0].vertex)?,
                None => writeln!(f, "  a{i}: v{down} -> (open)")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ReebGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReebGraph")
            .field("direction", &self.direction)
            .field("nodes", &self.nodes())
            .field("arcs", &self.arcs())
            .finish()
    }
}
