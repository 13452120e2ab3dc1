//! Dynamic connectivity over the preimage graph.
//!
//! Nodes are dense ids (the sweep uses mesh edge ids). Each tree is a rooted
//! parent-pointer tree whose root carries the skeleton arc of the contour the
//! tree represents. Edges carry an ordered weight; when a new edge would
//! close a cycle, the forest keeps the heavier of the new edge and the
//! lightest edge on the cycle, so the forest stays a maximum spanning forest
//! of everything inserted and not yet removed.
//!
//! With weights equal to the time at which an edge will be removed, deleting
//! a tree edge never needs a replacement search: any edge that could
//! reconnect the two halves would have been removed already.

pub mod dynamic;
pub mod node;

pub use dynamic::DynamicForest;
pub use node::ForestNode;

use itertools::Itertools;

use crate::skeleton::ArcId;

/// Outcome of [`DynamicConnectivity::insert_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Both endpoints were already connected; at most the lightest cycle edge
    /// was swapped for the new one.
    Internal,
    /// Two trees merged. `absorbed_arc` is the arc the losing root carried.
    Merged { absorbed_arc: Option<ArcId> },
}

impl Insertion {
    /// `true` if the insertion joined two previously separate trees.
    #[inline]
    pub fn merged(&self) -> bool {
        matches!(self, Insertion::Merged { .. })
    }
}

/// Rooted dynamic forest with path-local operations.
///
/// Operations on disjoint trees may run concurrently. Two callers must never
/// mutate the same tree at the same time.
pub trait DynamicConnectivity: Sync {
    type Weight: Copy + Ord;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_root(&self, n: usize) -> usize;

    /// Make `n` the root of its tree, moving the root's arc onto `n`.
    fn evert(&self, n: usize);

    fn insert_edge(&self, n1: usize, n2: usize, weight: Self::Weight) -> Insertion;

    /// Cut `n` from its parent. Returns `false` (and changes nothing) if `n`
    /// is a root.
    fn remove_edge(&self, n: usize) -> bool;

    /// Cut the edge between `n1` and `n2` if one is the other's parent.
    fn remove_edge_between(&self, n1: usize, n2: usize) -> bool;

    /// Root of `n` and the lightest non-root node on the path to it.
    fn find_min_weight_root(&self, n: usize) -> (usize, Option<usize>);

    /// Arc carried by the root of `n`'s tree.
    fn subtree_arc(&self, n: usize) -> Option<ArcId>;

    /// Store `arc` on the root of `n`'s tree.
    fn set_subtree_arc(&self, n: usize, arc: ArcId);

    /// Distinct roots of `nodes`, sorted.
    fn roots<I>(&self, nodes: I) -> Vec<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        nodes
            .into_iter()
            .map(|n| self.find_root(n))
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Number of distinct trees touched by `nodes`.
    fn nb_connected_components<I>(&self, nodes: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        self.roots(nodes).len()
    }

    fn is_connected(&self, a: usize, b: usize) -> bool {
        self.find_root(a) == self.find_root(b)
    }

    /// `true` if `n` is an isolated root.
    fn is_disconnected(&self, n: usize) -> bool;
}
