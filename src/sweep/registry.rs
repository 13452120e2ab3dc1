//! Shared identity bookkeeping for propagations.
//!
//! Every propagation gets a fresh id from a fixed-capacity table. When a join
//! saddle merges several propagations, their ids are unioned so edges stamped
//! with any of them count as owned by the survivor. The table is a lock-free
//! union-find: parents only ever move towards a root, so concurrent path
//! halving is harmless.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashSet;

pub(crate) struct PropagationRegistry {
    parents: Vec<AtomicUsize>,
    next: AtomicUsize,
    seeds: DashSet<usize>,
}

impl PropagationRegistry {
    /// Room for `capacity` propagations over the whole sweep.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            parents: (0..capacity).map(AtomicUsize::new).collect(),
            next: AtomicUsize::new(0),
            seeds: DashSet::new(),
        }
    }

    /// Allocate a fresh propagation id.
    pub fn register(&self) -> usize {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        assert!(
            id < self.parents.len(),
            "propagation registry exhausted ({} ids)",
            self.parents.len()
        );
        id
    }

    pub fn registered(&self) -> usize {
        self.next.load(Ordering::Relaxed).min(self.parents.len())
    }

    /// Representative id of `id`.
    pub fn find(&self, id: usize) -> usize {
        let mut cur = id;
        loop {
            let parent = self.parents[cur].load(Ordering::Acquire);
            if parent == cur {
                return cur;
            }
            let grand = self.parents[parent].load(Ordering::Acquire);
            if grand != parent {
                let _ = self.parents[cur].compare_exchange(
                    parent,
                    grand,
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                );
            }
            cur = grand;
        }
    }

    /// Make `into`'s representative the representative of `absorbed` too.
    ///
    /// Callers must own both identities, so roots never race here.
    pub fn union(&self, absorbed: usize, into: usize) {
        let a = self.find(absorbed);
        let b = self.find(into);
        if a != b {
            self.parents[a].store(b, Ordering::Release);
        }
    }

    /// Record a seed vertex. Returns `false` if it was already known.
    pub fn mark_seed(&self, vertex: usize) -> bool {
        self.seeds.insert(vertex)
    }

    /// Claim a seed. Returns `false` if it was already claimed or unknown.
    pub fn consume_seed(&self, vertex: usize) -> bool {
        self.seeds.remove(&vertex).is_some()
    }

    pub fn remaining_seeds(&self) -> usize {
        self.seeds.len()
    }
}
