//! A local propagation: one contour component being swept upwards.

use std::collections::BTreeSet;

use crate::skeleton::ArcId;

/// Lifecycle of a propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationState {
    /// Created from a leaf, nothing processed yet.
    Seeded,
    Growing,
    /// Waiting at, or resolving, a join saddle.
    Merging,
    /// Handing parts of its frontier to new propagations.
    Splitting,
    Done,
}

/// Frontier of pending vertices plus the identity used for edge ownership.
///
/// The frontier is keyed by `(rank, vertex)` so the next vertex to process is
/// always the lowest one in sweep order.
#[derive(Debug)]
pub struct Propagation {
    id: usize,
    frontier: BTreeSet<(usize, usize)>,
    current: Option<usize>,
    arc: Option<ArcId>,
    state: PropagationState,
}

impl Propagation {
    /// A propagation with an empty frontier.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            frontier: BTreeSet::new(),
            current: None,
            arc: None,
            state: PropagationState::Seeded,
        }
    }

    /// A propagation starting at `seed`.
    pub fn from_seed(id: usize, seed: usize, rank: usize) -> Self {
        let mut p = Self::new(id);
        p.add_vertex(seed, rank);
        p
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Vertex most recently returned by [`next_vertex`](Self::next_vertex).
    #[inline]
    pub fn current_vertex(&self) -> Option<usize> {
        self.current
    }

    #[inline]
    pub fn arc(&self) -> Option<ArcId> {
        self.arc
    }

    pub fn set_arc(&mut self, arc: Option<ArcId>) {
        self.arc = arc;
    }

    #[inline]
    pub fn state(&self) -> PropagationState {
        self.state
    }

    pub fn set_state(&mut self, state: PropagationState) {
        self.state = state;
    }

    /// Queue `vertex`; queuing it twice has no effect.
    pub fn add_vertex(&mut self, vertex: usize, rank: usize) {
        self.frontier.insert((rank, vertex));
    }

    /// Pop the lowest pending vertex.
    pub fn next_vertex(&mut self) -> Option<usize> {
        let (_, v) = self.frontier.pop_first()?;
        self.current = Some(v);
        Some(v)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    #[inline]
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Take over the whole frontier of `other`.
    pub fn absorb(&mut self, mut other: Propagation) {
        self.frontier.append(&mut other.frontier);
    }

    /// Empty the frontier, returning `(rank, vertex)` pairs in sweep order.
    pub fn take_frontier(&mut self) -> Vec<(usize, usize)> {
        std::mem::take(&mut self.frontier).into_iter().collect()
    }
}
