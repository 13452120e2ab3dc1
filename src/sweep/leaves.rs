//! Parallel search for the extrema that seed the sweep.

use rayon::prelude::*;

use super::registry::PropagationRegistry;
use crate::skeleton::NodeKind;
use crate::topology::{SweepDirection, TriangulatedMesh, VertexOrder};

/// A local extremum of the scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub vertex: usize,
    /// [`NodeKind::Minimum`] or [`NodeKind::Maximum`].
    pub kind: NodeKind,
}

impl Leaf {
    /// `true` if the sweep starts a propagation here.
    pub fn is_source(&self, direction: SweepDirection) -> bool {
        match direction {
            SweepDirection::Ascending => self.kind == NodeKind::Minimum,
            SweepDirection::Descending => self.kind == NodeKind::Maximum,
        }
    }
}

/// Find every local minimum and maximum.
///
/// Only the sources of the sweep direction (minima when ascending) seed
/// propagations. Sinks are reported for inspection only: the sweep reaches
/// them as the vertices where a contour dies, and places their nodes then.
/// A vertex with no neighbours is reported once, as the sweep's source kind.
pub fn leaf_search<M: TriangulatedMesh>(mesh: &M, order: &VertexOrder) -> Vec<Leaf> {
    let ascending = order.direction() == SweepDirection::Ascending;
    let (source, sink) = if ascending {
        (NodeKind::Minimum, NodeKind::Maximum)
    } else {
        (NodeKind::Maximum, NodeKind::Minimum)
    };
    (0..mesh.vertex_count())
        .into_par_iter()
        .filter_map(|v| {
            let neighbors = mesh.vertex_neighbors(v);
            if neighbors.iter().all(|&n| order.is_lower(v, n)) {
                Some(Leaf { vertex: v, kind: source })
            } else if neighbors.iter().all(|&n| order.is_lower(n, v)) {
                Some(Leaf { vertex: v, kind: sink })
            } else {
                None
            }
        })
        .collect()
}

/// Register the sources of `leaves` as seeds, returning them in sweep order.
pub(crate) fn register_seeds(
    leaves: &[Leaf],
    order: &VertexOrder,
    registry: &PropagationRegistry,
) -> Vec<usize> {
    let mut seeds: Vec<usize> = leaves
        .par_iter()
        .filter(|leaf| leaf.is_source(order.direction()))
        .map(|leaf| leaf.vertex)
        .filter(|&v| registry.mark_seed(v))
        .collect();
    seeds.sort_unstable_by_key(|&v| order.rank(v));
    seeds
}
