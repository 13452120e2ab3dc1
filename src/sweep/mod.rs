//! Growth driver: builds a Reeb graph from a prepared mesh and a scalar field.
//!
//! The build runs in three phases on a dedicated rayon pool:
//!
//! 1. leaf search, in parallel over all vertices;
//! 2. one propagation per source extremum, grown as scope tasks, with joins
//!    resolved through a saddle rendezvous and splits spawning new tasks;
//! 3. a termination check: no parked propagation, no unclaimed seed.
//!
//! ```
//! use reeb_sweep::prelude::*;
//!
//! let mut mesh = TriangleMesh::new(4, vec![[0, 2, 3], [1, 2, 3]]).unwrap();
//! mesh.preprocess();
//! let field = ScalarField::new(vec![0.0, 1.0, 2.0, 3.0]);
//!
//! let mut ftr = FtrGraph::new(field, FtrConfig::default());
//! ftr.setup_triangulation(&mesh);
//! let graph = ftr.build().unwrap();
//! assert_eq!(graph.canonical_arcs(), vec![(0, 2), (1, 2), (2, 3)]);
//! ```

mod growth;
mod leaves;
mod propagation;
mod registry;
mod rendezvous;
mod star;

pub use leaves::{Leaf, leaf_search};
pub use propagation::{Propagation, PropagationState};

use std::time::Instant;

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::forest::DynamicForest;
use crate::reeb_error::ReebError;
use crate::skeleton::ReebGraph;
use crate::topology::{ScalarField, SweepDirection, TriangulatedMesh};
use growth::Sweep;

/// Build parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtrConfig {
    /// Worker threads; `0` lets rayon decide.
    pub threads: usize,
    pub direction: SweepDirection,
    /// `0` is silent; anything higher logs a build summary at `info` level.
    pub debug_level: u8,
}

impl Default for FtrConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            direction: SweepDirection::Ascending,
            debug_level: 0,
        }
    }
}

/// Reeb graph builder bound to one scalar field.
pub struct FtrGraph<'m, M, T> {
    mesh: Option<&'m M>,
    scalars: ScalarField<T>,
    config: FtrConfig,
}

impl<'m, M, T> FtrGraph<'m, M, T>
where
    M: TriangulatedMesh,
    T: Float + Send + Sync,
{
    pub fn new(scalars: ScalarField<T>, config: FtrConfig) -> Self {
        Self {
            mesh: None,
            scalars,
            config,
        }
    }

    /// Attach the mesh to sweep. It must be preprocessed before [`build`](Self::build).
    pub fn setup_triangulation(&mut self, mesh: &'m M) {
        self.mesh = Some(mesh);
    }

    pub fn set_thread_number(&mut self, threads: usize) {
        self.config.threads = threads;
    }

    pub fn set_debug_level(&mut self, level: u8) {
        self.config.debug_level = level;
    }

    pub fn set_direction(&mut self, direction: SweepDirection) {
        self.config.direction = direction;
    }

    pub fn config(&self) -> &FtrConfig {
        &self.config
    }

    pub fn scalars(&self) -> &ScalarField<T> {
        &self.scalars
    }

    /// Run the sweep and return the finished skeleton.
    pub fn build(&self) -> Result<ReebGraph, ReebError> {
        let mesh = match self.mesh {
            Some(mesh) if mesh.is_prepared() => mesh,
            _ => return Err(ReebError::MeshNotPrepared),
        };
        if self.scalars.len() != mesh.vertex_count() {
            return Err(ReebError::ScalarLengthMismatch {
                expected: mesh.vertex_count(),
                found: self.scalars.len(),
            });
        }

        let start = Instant::now();
        let order = self.scalars.order(self.config.direction)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| ReebError::ThreadPool(e.to_string()))?;

        let forest = DynamicForest::<usize>::new(mesh.edge_count());
        let skeleton = ReebGraph::new(mesh.vertex_count(), self.config.direction);
        let sweep = Sweep::new(mesh, &order, &forest, &skeleton);

        let leaves = pool.install(|| leaf_search(mesh, &order));
        let seeds = pool.install(|| leaves::register_seeds(&leaves, &order, sweep.registry()));
        log::debug!(
            "leaf search: {} extrema, {} seeds ({:?} sweep)",
            leaves.len(),
            seeds.len(),
            self.config.direction
        );

        sweep.sweep_from_seeds(&pool, &seeds);
        let propagations = sweep.finish()?;
        log::debug!("sweep finished with {propagations} propagations");

        crate::debug_invariants!(forest.validate_invariants(), "preimage forest after sweep");
        crate::debug_invariants!(skeleton.validate_invariants(), "skeleton after sweep");

        if self.config.debug_level > 0 {
            log::info!(
                "reeb graph: {} nodes, {} arcs from {} seeds on {} threads in {:?}",
                skeleton.node_count(),
                skeleton.arc_count(),
                seeds.len(),
                pool.current_num_threads(),
                start.elapsed()
            );
        }
        Ok(skeleton)
    }
}

/// Build a Reeb graph in one call.
pub fn compute_reeb_graph<M, T>(
    mesh: &M,
    scalars: ScalarField<T>,
    config: FtrConfig,
) -> Result<ReebGraph, ReebError>
where
    M: TriangulatedMesh,
    T: Float + Send + Sync,
{
    let mut ftr = FtrGraph::new(scalars, config);
    ftr.setup_triangulation(mesh);
    ftr.build()
}
