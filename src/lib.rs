#![cfg_attr(docsrs, feature(doc_cfg))]
//! # reeb-sweep
//!
//! reeb-sweep computes the Reeb graph of a scalar field defined on the
//! vertices of a triangulated surface or volume. The graph tracks how the
//! connected components of level sets appear, merge, split and vanish as the
//! scalar value sweeps across its range.
//!
//! ## How it works
//! - Every local extremum seeds a *propagation* that sweeps the mesh in
//!   scalar order, one vertex at a time.
//! - Each propagation maintains the contour it is sweeping as a tree of a
//!   shared [`forest::DynamicForest`], whose nodes are the mesh edges
//!   crossing the current level.
//! - Propagations meeting at a join saddle merge through a lock-free
//!   rendezvous; a propagation reaching a split saddle spawns one task per
//!   new contour component.
//! - Nodes and arcs are written concurrently into a [`skeleton::ReebGraph`].
//!
//! Propagations run as tasks of a dedicated rayon pool. The resulting graph
//! does not depend on the number of threads nor on the sweep direction.
//!
//! ## Determinism
//!
//! Ties between equal scalar values are broken by optional per-vertex offsets
//! and then by vertex id, so every build sees the same strict vertex order.
//! Tests that draw random fields use fixed `SmallRng` seeds.
//!
//! ## Usage
//!
//! ```
//! use reeb_sweep::prelude::*;
//! use reeb_sweep::topology::meshgen::{Periodicity, triangle_grid};
//!
//! let grid = triangle_grid(8, 8, [0.0, 0.0], [1.0, 1.0], Periodicity::none()).unwrap();
//! let mut mesh = grid.mesh;
//! mesh.preprocess();
//! let heights: Vec<f64> = grid.coordinates.iter().map(|c| c[0] + 0.3 * c[1]).collect();
//!
//! let graph = compute_reeb_graph(&mesh, ScalarField::new(heights), FtrConfig::default()).unwrap();
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.arc_count(), 1);
//! ```

pub mod debug_invariants;
pub mod forest;
pub mod reeb_error;
pub mod skeleton;
pub mod sweep;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use reeb_error::ReebError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::forest::{DynamicConnectivity, DynamicForest, Insertion};
    pub use crate::reeb_error::ReebError;
    pub use crate::skeleton::{ArcId, NodeId, NodeKind, ReebGraph, SkeletonSink};
    pub use crate::sweep::{FtrConfig, FtrGraph, compute_reeb_graph};
    pub use crate::topology::{
        ScalarField, SweepDirection, TriangleMesh, TriangulatedMesh, VertexOrder,
    };
}
