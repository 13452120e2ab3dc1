//! Triangulated mesh adjacency consumed by the sweep.
//!
//! The sweep never walks a mesh directly: it asks a [`TriangulatedMesh`] for
//! vertex neighbours, vertex triangles, triangle edges and edge triangles.
//! [`TriangleMesh`] is the in-memory implementation. Every adjacency relation
//! is stored in CSR form (`xadj[i]..xadj[i+1]` indexes into a flat list) and
//! has to be built by an explicit preprocessing step before the mesh can be
//! queried. Building a Reeb graph on a mesh that was not preprocessed fails
//! with [`ReebError::MeshNotPrepared`].

use rayon::prelude::*;

use crate::reeb_error::ReebError;

/// Read-only adjacency queries over a simplicial mesh.
///
/// All ids are dense indices: vertices in `0..vertex_count()`, edges in
/// `0..edge_count()`, triangles in `0..triangle_count()`. Passing an id
/// outside those ranges is a precondition violation and may panic.
///
/// Implementors must be safe to query from many threads at once.
pub trait TriangulatedMesh: Sync {
    fn vertex_count(&self) -> usize;
    fn edge_count(&self) -> usize;
    fn triangle_count(&self) -> usize;

    /// `true` once every adjacency relation below can be queried.
    fn is_prepared(&self) -> bool;

    /// Neighbouring vertices of `v`, sorted by id.
    fn vertex_neighbors(&self, v: usize) -> &[usize];
    /// Edges incident to `v`, aligned with [`vertex_neighbors`](Self::vertex_neighbors).
    fn vertex_edges(&self, v: usize) -> &[usize];
    /// Triangles incident to `v`.
    fn vertex_triangles(&self, v: usize) -> &[usize];
    /// Endpoints of `e`, smaller id first.
    fn edge_vertices(&self, e: usize) -> [usize; 2];
    /// Triangles incident to `e`.
    fn edge_triangles(&self, e: usize) -> &[usize];
    /// Vertices of `t`, sorted by id.
    fn triangle_vertices(&self, t: usize) -> [usize; 3];
    /// Edges of `t`.
    fn triangle_edges(&self, t: usize) -> [usize; 3];

    /// The endpoint of `e` that is not `v`.
    #[inline]
    fn edge_other_vertex(&self, e: usize, v: usize) -> usize {
        let [a, b] = self.edge_vertices(e);
        if a == v { b } else { a }
    }
}

/// CSR offsets plus a flat value list.
#[derive(Debug, Clone, Default)]
struct Csr {
    xadj: Vec<usize>,
    adjncy: Vec<usize>,
}

impl Csr {
    /// Build from `(row, value)` pairs; values keep their input order per row.
    fn from_pairs(rows: usize, pairs: impl IntoIterator<Item = (usize, usize)> + Clone) -> Self {
        let mut xadj = vec![0usize; rows + 1];
        for (row, _) in pairs.clone() {
            xadj[row + 1] += 1;
        }
        for i in 0..rows {
            xadj[i + 1] += xadj[i];
        }
        let mut fill = xadj.clone();
        let mut adjncy = vec![0usize; xadj[rows]];
        for (row, value) in pairs {
            adjncy[fill[row]] = value;
            fill[row] += 1;
        }
        Self { xadj, adjncy }
    }

    #[inline]
    fn row(&self, i: usize) -> &[usize] {
        &self.adjncy[self.xadj[i]..self.xadj[i + 1]]
    }

    fn is_built(&self) -> bool {
        !self.xadj.is_empty()
    }
}

/// Triangle soup with lazily built CSR adjacency.
///
/// ```
/// use reeb_sweep::topology::mesh::{TriangleMesh, TriangulatedMesh};
/// let mut mesh = TriangleMesh::new(4, vec![[0, 1, 2], [1, 2, 3]]).unwrap();
/// assert!(!mesh.is_prepared());
/// mesh.preprocess();
/// assert_eq!(mesh.edge_count(), 5);
/// assert_eq!(mesh.vertex_neighbors(1), &[0, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    vertex_count: usize,
    triangles: Vec<[usize; 3]>,
    /// Sorted, unique `(lo, hi)` pairs; the index is the edge id.
    edges: Vec<[usize; 2]>,
    triangle_edges: Vec<[usize; 3]>,
    vertex_neighbors: Csr,
    vertex_edges: Csr,
    vertex_triangles: Csr,
    edge_triangles: Csr,
}

impl TriangleMesh {
    /// Create a mesh from triangles over `vertex_count` vertices.
    ///
    /// Triangle vertices are stored sorted; duplicate triangles are removed.
    pub fn new(vertex_count: usize, triangles: Vec<[usize; 3]>) -> Result<Self, ReebError> {
        let mut sorted = Vec::with_capacity(triangles.len());
        for (cell, mut tri) in triangles.into_iter().enumerate() {
            for &vertex in &tri {
                if vertex >= vertex_count {
                    return Err(ReebError::VertexOutOfRange {
                        cell,
                        vertex,
                        vertex_count,
                    });
                }
            }
            tri.sort_unstable();
            if tri[0] == tri[1] || tri[1] == tri[2] {
                return Err(ReebError::DegenerateCell(cell));
            }
            sorted.push(tri);
        }
        sorted.par_sort_unstable();
        sorted.dedup();
        Ok(Self {
            vertex_count,
            triangles: sorted,
            edges: Vec::new(),
            triangle_edges: Vec::new(),
            vertex_neighbors: Csr::default(),
            vertex_edges: Csr::default(),
            vertex_triangles: Csr::default(),
            edge_triangles: Csr::default(),
        })
    }

    /// Create a mesh from the triangles of a tetrahedral mesh.
    pub fn from_tetrahedra(
        vertex_count: usize,
        tetrahedra: &[[usize; 4]],
    ) -> Result<Self, ReebError> {
        let mut triangles = Vec::with_capacity(tetrahedra.len() * 4);
        for (cell, tet) in tetrahedra.iter().enumerate() {
            let mut t = *tet;
            t.sort_unstable();
            if t.windows(2).any(|w| w[0] == w[1]) {
                return Err(ReebError::DegenerateCell(cell));
            }
            triangles.push([t[0], t[1], t[2]]);
            triangles.push([t[0], t[1], t[3]]);
            triangles.push([t[0], t[2], t[3]]);
            triangles.push([t[1], t[2], t[3]]);
        }
        Self::new(vertex_count, triangles)
    }

    /// Run every preprocessing step.
    pub fn preprocess(&mut self) {
        self.preprocess_vertex_neighbors();
        self.preprocess_vertex_triangles();
        self.preprocess_triangle_edges();
        self.preprocess_edge_triangles();
    }

    /// Build vertex → neighbour and vertex → edge lists.
    pub fn preprocess_vertex_neighbors(&mut self) {
        if self.vertex_neighbors.is_built() {
            return;
        }
        self.ensure_edges();
        // (vertex, neighbour, edge), sorted so every row is ordered by neighbour.
        let mut pairs: Vec<(usize, usize, usize)> = Vec::with_capacity(self.edges.len() * 2);
        for (id, &[a, b]) in self.edges.iter().enumerate() {
            pairs.push((a, b, id));
            pairs.push((b, a, id));
        }
        pairs.par_sort_unstable();
        self.vertex_neighbors = Csr::from_pairs(
            self.vertex_count,
            pairs.iter().map(|&(v, other, _)| (v, other)),
        );
        self.vertex_edges =
            Csr::from_pairs(self.vertex_count, pairs.iter().map(|&(v, _, id)| (v, id)));
    }

    /// Build vertex → triangle lists.
    pub fn preprocess_vertex_triangles(&mut self) {
        if self.vertex_triangles.is_built() {
            return;
        }
        let pairs = self
            .triangles
            .iter()
            .enumerate()
            .flat_map(|(t, tri)| tri.iter().map(move |&v| (v, t)));
        self.vertex_triangles = Csr::from_pairs(self.vertex_count, pairs);
    }

    /// Build triangle → edge lists.
    pub fn preprocess_triangle_edges(&mut self) {
        if !self.triangle_edges.is_empty() || self.triangles.is_empty() {
            return;
        }
        self.ensure_edges();
        let edges = &self.edges;
        self.triangle_edges = self
            .triangles
            .par_iter()
            .map(|&[a, b, c]| {
                [
                    edge_index(edges, a, b),
                    edge_index(edges, a, c),
                    edge_index(edges, b, c),
                ]
            })
            .collect();
    }

    /// Build edge → triangle lists.
    pub fn preprocess_edge_triangles(&mut self) {
        if self.edge_triangles.is_built() {
            return;
        }
        self.preprocess_triangle_edges();
        let pairs = self
            .triangle_edges
            .iter()
            .enumerate()
            .flat_map(|(t, es)| es.iter().map(move |&e| (e, t)));
        self.edge_triangles = Csr::from_pairs(self.edges.len(), pairs);
    }

    /// Id of the edge joining `u` and `v`, if any.
    pub fn edge_between(&self, u: usize, v: usize) -> Option<usize> {
        let key = if u < v { [u, v] } else { [v, u] };
        self.edges.binary_search(&key).ok()
    }

    fn ensure_edges(&mut self) {
        if !self.edges.is_empty() || self.triangles.is_empty() {
            return;
        }
        let mut edges: Vec<[usize; 2]> = self
            .triangles
            .par_iter()
            .flat_map_iter(|&[a, b, c]| [[a, b], [a, c], [b, c]])
            .collect();
        edges.par_sort_unstable();
        edges.dedup();
        self.edges = edges;
    }
}

#[inline]
fn edge_index(edges: &[[usize; 2]], a: usize, b: usize) -> usize {
    match edges.binary_search(&[a, b]) {
        Ok(i) => i,
        Err(_) => unreachable!("triangle edge ({a}, {b}) missing from edge list"),
    }
}

impl TriangulatedMesh for TriangleMesh {
    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn is_prepared(&self) -> bool {
        self.vertex_neighbors.is_built()
            && self.vertex_triangles.is_built()
            && self.edge_triangles.is_built()
            && self.triangle_edges.len() == self.triangles.len()
    }

    #[inline]
    fn vertex_neighbors(&self, v: usize) -> &[usize] {
        self.vertex_neighbors.row(v)
    }

    #[inline]
    fn vertex_edges(&self, v: usize) -> &[usize] {
        self.vertex_edges.row(v)
    }

    #[inline]
    fn vertex_triangles(&self, v: usize) -> &[usize] {
        self.vertex_triangles.row(v)
    }

    #[inline]
    fn edge_vertices(&self, e: usize) -> [usize; 2] {
        self.edges[e]
    }

    #[inline]
    fn edge_triangles(&self, e: usize) -> &[usize] {
        self.edge_triangles.row(e)
    }

    #[inline]
    fn triangle_vertices(&self, t: usize) -> [usize; 3] {
        self.triangles[t]
    }

    #[inline]
    fn triangle_edges(&self, t: usize) -> [usize; 3] {
        self.triangle_edges[t]
    }
}
