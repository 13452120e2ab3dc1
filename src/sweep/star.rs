//! Local mesh queries around a vertex, in sweep order.

use std::collections::VecDeque;

use hashbrown::HashSet;

use crate::topology::{TriangulatedMesh, VertexOrder};

/// Edges around a vertex split by the sweep order of their other endpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Star {
    pub lower: Vec<usize>,
    pub upper: Vec<usize>,
}

pub(crate) fn visit_star<M: TriangulatedMesh>(mesh: &M, order: &VertexOrder, v: usize) -> Star {
    let mut star = Star::default();
    for (&n, &e) in mesh.vertex_neighbors(v).iter().zip(mesh.vertex_edges(v)) {
        if order.is_lower(n, v) {
            star.lower.push(e);
        } else {
            star.upper.push(e);
        }
    }
    star
}

/// Where the swept vertex sits inside a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellPosition {
    /// Lowest vertex: the triangle enters the preimage.
    Start,
    /// Middle vertex: the preimage edge moves across the triangle.
    Middle,
    /// Highest vertex: the triangle leaves the preimage.
    End,
}

/// A triangle with its vertices sorted in sweep order.
///
/// With vertices `a < b < c`, `edges` holds `[ab, ac, bc]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OrderedTriangle {
    pub vertices: [usize; 3],
    pub edges: [usize; 3],
}

impl OrderedTriangle {
    pub fn new<M: TriangulatedMesh>(mesh: &M, order: &VertexOrder, t: usize) -> Self {
        let mut vertices = mesh.triangle_vertices(t);
        vertices.sort_unstable_by_key(|&v| order.rank(v));
        let [a, b, c] = vertices;
        let mut edges = [0usize; 3];
        for e in mesh.triangle_edges(t) {
            let [p, q] = mesh.edge_vertices(e);
            let slot = match (p == a || q == a, p == c || q == c) {
                (true, false) => 0,
                (true, true) => 1,
                _ => 2,
            };
            edges[slot] = e;
        }
        debug_assert!(mesh.edge_vertices(edges[2]).contains(&b));
        Self { vertices, edges }
    }

    pub fn position(&self, v: usize) -> CellPosition {
        match self.vertices.iter().position(|&x| x == v) {
            Some(0) => CellPosition::Start,
            Some(1) => CellPosition::Middle,
            _ => CellPosition::End,
        }
    }

    #[inline]
    pub fn ab(&self) -> usize {
        self.edges[0]
    }
    #[inline]
    pub fn ac(&self) -> usize {
        self.edges[1]
    }
    #[inline]
    pub fn bc(&self) -> usize {
        self.edges[2]
    }
}

/// Weight of the preimage edge joining crossing edges `e1` and `e2`: the rank
/// at which the first of them stops crossing.
pub(crate) fn removal_rank<M: TriangulatedMesh>(
    mesh: &M,
    order: &VertexOrder,
    e1: usize,
    e2: usize,
) -> usize {
    let upper = |e: usize| {
        let [p, q] = mesh.edge_vertices(e);
        order.rank(p).max(order.rank(q))
    };
    upper(e1).min(upper(e2))
}

/// Group the upper edges of `v` into the contour components they start.
///
/// Two upper edges belong together when a chain of triangles in which `v`
/// is the lowest vertex connects them.
pub(crate) fn upper_regions<M: TriangulatedMesh>(
    mesh: &M,
    order: &VertexOrder,
    v: usize,
    upper: &[usize],
) -> Vec<Vec<usize>> {
    let upper_set: HashSet<usize> = upper.iter().copied().collect();
    let mut seen: HashSet<usize> = HashSet::with_capacity(upper.len());
    let mut regions = Vec::new();
    let mut queue = VecDeque::new();

    for &start in upper {
        if !seen.insert(start) {
            continue;
        }
        let mut region = vec![start];
        queue.push_back(start);
        while let Some(e) = queue.pop_front() {
            for &t in mesh.edge_triangles(e) {
                if mesh
                    .triangle_vertices(t)
                    .iter()
                    .any(|&x| x != v && order.is_lower(x, v))
                {
                    continue;
                }
                for other in mesh.triangle_edges(t) {
                    if other != e && upper_set.contains(&other) && seen.insert(other) {
                        region.push(other);
                        queue.push_back(other);
                    }
                }
            }
        }
        regions.push(region);
    }
    regions
}
