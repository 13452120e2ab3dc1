//! Local growth of propagations over the mesh.
//!
//! A propagation pops the lowest vertex of its frontier, updates the preimage
//! forest for the triangles around it and decides, from the number of contour
//! components just below and just above, whether the vertex is regular or
//! critical. Join saddles go through the [`SaddleRendezvous`]; split saddles
//! hand parts of the frontier to new propagations spawned on the same scope.
//!
//! Every mesh edge crossing the current level belongs to exactly one contour
//! component, and is stamped with the id of the propagation sweeping that
//! component. Propagations therefore only ever touch their own forest trees.

use std::sync::atomic::{AtomicUsize, Ordering};

use hashbrown::HashMap;
use rayon::{Scope, ThreadPool};

use super::propagation::{Propagation, PropagationState};
use super::registry::PropagationRegistry;
use super::rendezvous::{Arrival, SaddleRendezvous};
use super::star::{CellPosition, OrderedTriangle, Star, removal_rank, upper_regions, visit_star};
use crate::forest::DynamicConnectivity;
use crate::reeb_error::ReebError;
use crate::skeleton::{ArcId, NodeId, SkeletonSink};
use crate::topology::{TriangulatedMesh, VertexOrder};

const UNOWNED: usize = usize::MAX;

enum Step {
    Continue,
    Finished,
    Split(Vec<Propagation>),
}

pub(crate) struct Sweep<'a, M, F, S> {
    mesh: &'a M,
    order: &'a VertexOrder,
    forest: &'a F,
    skeleton: &'a S,
    registry: PropagationRegistry,
    rendezvous: SaddleRendezvous,
    edge_owner: Vec<AtomicUsize>,
}

impl<'a, M, F, S> Sweep<'a, M, F, S>
where
    M: TriangulatedMesh,
    F: DynamicConnectivity<Weight = usize>,
    S: SkeletonSink,
{
    pub fn new(mesh: &'a M, order: &'a VertexOrder, forest: &'a F, skeleton: &'a S) -> Self {
        debug_assert_eq!(forest.len(), mesh.edge_count());
        Self {
            mesh,
            order,
            forest,
            skeleton,
            // seeds plus at most one new propagation per split component,
            // which is bounded by the number of crossing edges
            registry: PropagationRegistry::with_capacity(mesh.vertex_count() + mesh.edge_count() + 1),
            rendezvous: SaddleRendezvous::new(),
            edge_owner: (0..mesh.edge_count())
                .map(|_| AtomicUsize::new(UNOWNED))
                .collect(),
        }
    }

    pub fn registry(&self) -> &PropagationRegistry {
        &self.registry
    }

    /// Grow one propagation per seed until every task has finished.
    pub fn sweep_from_seeds(&self, pool: &ThreadPool, seeds: &[usize]) {
        pool.scope(|scope| {
            for &seed in seeds {
                scope.spawn(move |scope| self.growth_from_seed(scope, seed));
            }
        });
    }

    /// Fail if any saddle still has parked propagations or any seed was
    /// never claimed.
    pub fn finish(&self) -> Result<usize, ReebError> {
        let pending_saddles = self.rendezvous.pending();
        let remaining_seeds = self.registry.remaining_seeds();
        if pending_saddles > 0 || remaining_seeds > 0 {
            return Err(ReebError::UnfinishedSweep {
                pending_saddles,
                remaining_seeds,
            });
        }
        Ok(self.registry.registered())
    }

    fn growth_from_seed<'s>(&'s self, scope: &Scope<'s>, seed: usize) {
        if !self.registry.consume_seed(seed) {
            return;
        }
        let id = self.registry.register();
        log::trace!("propagation {id} seeded at vertex {seed}");
        let prop = Propagation::from_seed(id, seed, self.order.rank(seed));
        self.local_growth(scope, prop);
    }

    fn local_growth<'s>(&'s self, scope: &Scope<'s>, mut prop: Propagation) {
        while let Some(v) = prop.next_vertex() {
            let star = visit_star(self.mesh, self.order, v);
            if !star.lower.is_empty() {
                match self.check_last(prop, v, &star.lower) {
                    Some(last) => prop = last,
                    None => return,
                }
            }
            prop.set_state(PropagationState::Growing);
            match self.update_vertex(&mut prop, v, &star) {
                Step::Continue => {}
                Step::Finished => {
                    debug_assert!(prop.is_empty(), "contour died at {v} with pending vertices");
                    break;
                }
                Step::Split(children) => {
                    for child in children {
                        log::trace!("propagation {} spawned at vertex {v}", child.id());
                        scope.spawn(move |scope| self.local_growth(scope, child));
                    }
                }
            }
        }
        prop.set_state(PropagationState::Done);
        log::trace!("propagation {} done", prop.id());
    }

    /// Representative id of the propagation owning crossing edge `e`.
    #[inline]
    fn owner_root(&self, e: usize) -> Option<usize> {
        match self.edge_owner[e].load(Ordering::Acquire) {
            UNOWNED => None,
            id => Some(self.registry.find(id)),
        }
    }

    /// Decide whether `prop` may process `v` now.
    ///
    /// Returns the propagation to continue with, which has absorbed every
    /// other propagation that reached `v`, or `None` if it had to park.
    fn check_last(&self, mut prop: Propagation, v: usize, lower: &[usize]) -> Option<Propagation> {
        let me = self.registry.find(prop.id());
        let owned = lower
            .iter()
            .filter(|&&e| self.owner_root(e) == Some(me))
            .count();
        if owned == lower.len() {
            return Some(prop);
        }
        prop.set_state(PropagationState::Merging);
        let id = prop.id();
        match self.rendezvous.arrive(v, lower.len(), owned, prop) {
            Arrival::Parked => {
                log::trace!("propagation {id} parked at vertex {v} ({owned}/{})", lower.len());
                None
            }
            Arrival::Last(mut prop, parked) => {
                self.merge_at_saddle(&mut prop, v, parked);
                Some(prop)
            }
        }
    }

    fn merge_at_saddle(&self, prop: &mut Propagation, v: usize, parked: Vec<Propagation>) {
        log::debug!(
            "join at vertex {v}: propagation {} absorbs {} other(s)",
            prop.id(),
            parked.len()
        );
        for other in parked {
            self.registry.union(other.id(), prop.id());
            prop.absorb(other);
        }
    }

    /// Apply the start, middle and end cell updates of every triangle around
    /// `v` to the preimage forest.
    fn update_preimage(&self, v: usize) {
        let triangles: Vec<OrderedTriangle> = self
            .mesh
            .vertex_triangles(v)
            .iter()
            .map(|&t| OrderedTriangle::new(self.mesh, self.order, t))
            .collect();

        for tri in triangles.iter().filter(|t| t.position(v) == CellPosition::Start) {
            let w = removal_rank(self.mesh, self.order, tri.ab(), tri.ac());
            self.forest.insert_edge(tri.ab(), tri.ac(), w);
        }
        for tri in triangles.iter().filter(|t| t.position(v) == CellPosition::Middle) {
            self.forest.remove_edge_between(tri.ab(), tri.ac());
            let w = removal_rank(self.mesh, self.order, tri.ac(), tri.bc());
            self.forest.insert_edge(tri.ac(), tri.bc(), w);
        }
        for tri in triangles.iter().filter(|t| t.position(v) == CellPosition::End) {
            self.forest.remove_edge_between(tri.ac(), tri.bc());
        }
    }

    fn update_vertex(&self, prop: &mut Propagation, v: usize, star: &Star) -> Step {
        let lower_roots = self.forest.roots(star.lower.iter().copied());
        let lower_arcs: Vec<ArcId> = lower_roots
            .iter()
            .filter_map(|&r| self.forest.subtree_arc(r))
            .collect();
        debug_assert_eq!(
            lower_arcs.len(),
            lower_roots.len(),
            "vertex {v}: lower contour component without an arc"
        );

        self.update_preimage(v);

        for &e in &star.upper {
            self.edge_owner[e].store(prop.id(), Ordering::Release);
            let w = self.mesh.edge_other_vertex(e, v);
            prop.add_vertex(w, self.order.rank(w));
        }

        let mut upper_roots: Vec<usize> = Vec::new();
        for region in upper_regions(self.mesh, self.order, v, &star.upper) {
            let root = self.forest.find_root(region[0]);
            debug_assert!(region.iter().all(|&e| self.forest.find_root(e) == root));
            if !upper_roots.contains(&root) {
                upper_roots.push(root);
            }
        }

        // regular vertex: one component in, one out
        if let ([_], [upper], [arc]) = (
            lower_roots.as_slice(),
            upper_roots.as_slice(),
            lower_arcs.as_slice(),
        ) {
            self.skeleton.extend_arc(*arc, v);
            self.forest.set_subtree_arc(*upper, *arc);
            return Step::Continue;
        }

        let node = self.skeleton.new_node(v);
        for &arc in &lower_arcs {
            self.skeleton.close_arc(arc, node);
        }
        match upper_roots.as_slice() {
            [] => {
                prop.set_arc(None);
                Step::Finished
            }
            [root] => {
                let arc = self.skeleton.new_arc(node);
                self.forest.set_subtree_arc(*root, arc);
                prop.set_arc(Some(arc));
                Step::Continue
            }
            _ => Step::Split(self.split_at_saddle(prop, v, node, &upper_roots)),
        }
    }

    /// Open one arc per upper component of `v` and distribute the frontier.
    ///
    /// `prop` keeps the first component; the returned propagations carry the
    /// others. A frontier vertex goes to every component owning one of its
    /// lower edges, and those edges are re-stamped with the new owner.
    fn split_at_saddle(
        &self,
        prop: &mut Propagation,
        v: usize,
        node: NodeId,
        upper_roots: &[usize],
    ) -> Vec<Propagation> {
        prop.set_state(PropagationState::Splitting);
        log::debug!(
            "split at vertex {v}: propagation {} into {} components",
            prop.id(),
            upper_roots.len()
        );
        let me = self.registry.find(prop.id());
        let comp_of: HashMap<usize, usize> = upper_roots
            .iter()
            .enumerate()
            .map(|(i, &root)| (root, i))
            .collect();
        let arcs: Vec<ArcId> = upper_roots
            .iter()
            .map(|&root| {
                let arc = self.skeleton.new_arc(node);
                self.forest.set_subtree_arc(root, arc);
                arc
            })
            .collect();
        let mut children: Vec<Propagation> = arcs[1..]
            .iter()
            .map(|&arc| {
                let mut child = Propagation::new(self.registry.register());
                child.set_arc(Some(arc));
                child.set_state(PropagationState::Growing);
                child
            })
            .collect();

        let mut targets: Vec<usize> = Vec::with_capacity(upper_roots.len());
        for (rank, x) in prop.take_frontier() {
            targets.clear();
            let lower_edges = self
                .mesh
                .vertex_neighbors(x)
                .iter()
                .zip(self.mesh.vertex_edges(x))
                .filter(|&(&n, _)| self.order.is_lower(n, x))
                .map(|(_, &e)| e);
            for e in lower_edges {
                if self.owner_root(e) != Some(me) {
                    continue;
                }
                let comp = comp_of.get(&self.forest.find_root(e)).copied();
                debug_assert!(comp.is_some(), "crossing edge {e} outside every component of {v}");
                let comp = comp.unwrap_or(0);
                if comp > 0 {
                    self.edge_owner[e].store(children[comp - 1].id(), Ordering::Release);
                }
                if !targets.contains(&comp) {
                    targets.push(comp);
                }
            }
            debug_assert!(!targets.is_empty(), "frontier vertex {x} owns no crossing edge");
            if targets.is_empty() {
                targets.push(0);
            }
            for &comp in &targets {
                match comp {
                    0 => prop.add_vertex(x, rank),
                    c => children[c - 1].add_vertex(x, rank),
                }
            }
        }

        prop.set_arc(Some(arcs[0]));
        prop.set_state(PropagationState::Growing);
        children
    }
}
