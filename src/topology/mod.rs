//! Mesh adjacency, scalar fields and structured mesh generators.
//!
//! The sweep only depends on the [`TriangulatedMesh`] trait and on a
//! [`VertexOrder`] derived from a [`ScalarField`].

pub mod mesh;
pub mod meshgen;
pub mod scalars;

pub use mesh::{TriangleMesh, TriangulatedMesh};
pub use scalars::{ScalarField, SweepDirection, VertexOrder};
