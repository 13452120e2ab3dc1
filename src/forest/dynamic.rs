//! Parent-pointer implementation of [`DynamicConnectivity`].
//!
//! Every node sits behind its own `parking_lot::Mutex`, and no operation ever
//! holds two node locks at once. Concurrent callers are therefore safe as long
//! as they work on disjoint trees, which is exactly the discipline the sweep
//! follows. All operations walk root paths, so their cost is proportional to
//! tree depth.

use std::fmt;

use parking_lot::Mutex;

use super::{DynamicConnectivity, ForestNode, Insertion};
use crate::debug_invariants::DebugInvariants;
use crate::reeb_error::ReebError;
use crate::skeleton::ArcId;

/// Dynamic forest over `len` nodes with edge weights of type `W`.
pub struct DynamicForest<W = usize> {
    nodes: Vec<Mutex<ForestNode<W>>>,
}

impl<W> DynamicForest<W>
where
    W: Copy + Ord + Default + Send,
{
    /// `len` isolated roots.
    pub fn new(len: usize) -> Self {
        Self {
            nodes: (0..len).map(|_| Mutex::new(ForestNode::default())).collect(),
        }
    }

    /// Snapshot of node `n`.
    #[inline]
    pub fn node(&self, n: usize) -> ForestNode<W> {
        *self.nodes[n].lock()
    }

    #[inline]
    fn parent(&self, n: usize) -> Option<usize> {
        self.nodes[n].lock().parent
    }

    /// Turn every node back into an isolated root.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            *node.get_mut() = ForestNode::default();
        }
    }

    /// Number of trees in the whole forest.
    pub fn tree_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.lock().is_root()).count()
    }

    /// Hang root `child` under `parent` through an edge of weight `weight`.
    fn link(&self, child: usize, parent: usize, weight: W) {
        {
            let mut c = self.nodes[child].lock();
            debug_assert!(c.is_root(), "link: node {child} is not a root");
            c.parent = Some(parent);
            c.weight = weight;
            c.arc = None;
        }
        self.nodes[parent].lock().child_count += 1;
    }

    /// Detach `n` from its parent; the new root carries no arc.
    fn cut(&self, n: usize) -> Option<usize> {
        let parent = {
            let mut node = self.nodes[n].lock();
            let parent = node.parent.take()?;
            node.weight = W::default();
            node.arc = None;
            parent
        };
        self.nodes[parent].lock().child_count -= 1;
        Some(parent)
    }

    /// Which of two roots keeps its root role on a merge: the one with more
    /// children, the lower id on a tie.
    fn survives(&self, r1: usize, r2: usize) -> bool {
        let c1 = self.nodes[r1].lock().child_count;
        let c2 = self.nodes[r2].lock().child_count;
        c1 > c2 || (c1 == c2 && r1 < r2)
    }
}

impl<W> DynamicConnectivity for DynamicForest<W>
where
    W: Copy + Ord + Default + Send,
{
    type Weight = W;

    #[inline]
    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn find_root(&self, n: usize) -> usize {
        let mut cur = n;
        while let Some(p) = self.parent(cur) {
            cur = p;
        }
        cur
    }

    fn evert(&self, n: usize) {
        let mut prev: Option<usize> = None;
        let mut prev_weight = W::default();
        let mut cur = Some(n);
        while let Some(c) = cur {
            let mut node = self.nodes[c].lock();
            let next = node.parent;
            let weight = node.weight;
            node.parent = prev;
            node.weight = prev_weight;
            if prev.is_some() {
                node.child_count -= 1;
            }
            if next.is_some() {
                node.child_count += 1;
            }
            drop(node);
            prev = Some(c);
            prev_weight = weight;
            cur = next;
        }
        if let Some(old_root) = prev.filter(|&r| r != n) {
            let arc = self.nodes[old_root].lock().arc.take();
            self.nodes[n].lock().arc = arc;
        }
    }

    fn insert_edge(&self, n1: usize, n2: usize, weight: W) -> Insertion {
        if n1 == n2 {
            return Insertion::Internal;
        }
        let r1 = self.find_root(n1);
        let r2 = self.find_root(n2);

        if r1 == r2 {
            // Cycle: keep the heavier of the new edge and the lightest path edge.
            self.evert(n1);
            let (_, lightest) = self.find_min_weight_root(n2);
            if let Some(m) = lightest {
                if self.nodes[m].lock().weight < weight {
                    self.cut(m);
                    self.evert(n2);
                    self.link(n2, n1, weight);
                }
            }
            self.evert(r1);
            return Insertion::Internal;
        }

        let (keep, hang, loser) = if self.survives(r1, r2) {
            (n1, n2, r2)
        } else {
            (n2, n1, r1)
        };
        let absorbed_arc = self.nodes[loser].lock().arc.take();
        self.evert(hang);
        self.link(hang, keep, weight);
        Insertion::Merged { absorbed_arc }
    }

    fn remove_edge(&self, n: usize) -> bool {
        if self.parent(n).is_none() {
            log::warn!("remove_edge: node {n} is a root, nothing to cut");
            return false;
        }
        let arc = self.subtree_arc(n);
        self.cut(n);
        self.nodes[n].lock().arc = arc;
        true
    }

    fn remove_edge_between(&self, n1: usize, n2: usize) -> bool {
        if self.parent(n1) == Some(n2) {
            self.remove_edge(n1)
        } else if self.parent(n2) == Some(n1) {
            self.remove_edge(n2)
        } else {
            false
        }
    }

    fn find_min_weight_root(&self, n: usize) -> (usize, Option<usize>) {
        let mut cur = n;
        let mut lightest: Option<(W, usize)> = None;
        loop {
            let node = self.node(cur);
            match node.parent {
                Some(p) => {
                    if lightest.is_none_or(|(w, _)| node.weight < w) {
                        lightest = Some((node.weight, cur));
                    }
                    cur = p;
                }
                None => return (cur, lightest.map(|(_, m)| m)),
            }
        }
    }

    fn subtree_arc(&self, n: usize) -> Option<ArcId> {
        let root = self.find_root(n);
        self.nodes[root].lock().arc
    }

    fn set_subtree_arc(&self, n: usize, arc: ArcId) {
        let root = self.find_root(n);
        self.nodes[root].lock().arc = Some(arc);
    }

    fn is_disconnected(&self, n: usize) -> bool {
        let node = self.nodes[n].lock();
        node.parent.is_none() && node.child_count == 0
    }
}

impl<W> DebugInvariants for DynamicForest<W>
where
    W: Copy + Ord + Default + Send,
{
    fn validate_invariants(&self) -> Result<(), ReebError> {
        let len = self.nodes.len();
        let mut children = vec![0u32; len];
        for n in 0..len {
            let node = self.node(n);
            if let Some(p) = node.parent {
                if p >= len {
                    return Err(ReebError::InvariantViolation(format!(
                        "forest node {n} has parent {p} out of range"
                    )));
                }
                children[p] += 1;
                if node.arc.is_some() {
                    return Err(ReebError::InvariantViolation(format!(
                        "forest node {n} carries an arc but is not a root"
                    )));
                }
            }
            let mut cur = n;
            let mut steps = 0usize;
            while let Some(p) = self.parent(cur) {
                cur = p;
                steps += 1;
                if steps > len {
                    return Err(ReebError::InvariantViolation(format!(
                        "forest node {n} reaches a cycle"
                    )));
                }
            }
        }
        for (n, &count) in children.iter().enumerate() {
            let stored = self.node(n).child_count;
            if stored != count {
                return Err(ReebError::InvariantViolation(format!(
                    "forest node {n} records {stored} children, has {count}"
                )));
            }
        }
        Ok(())
    }
}

impl<W> fmt::Display for DynamicForest<W>
where
    W: Copy + Ord + Default + Send + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, node) in self.nodes.iter().enumerate() {
            let node = *node.lock();
            match (node.parent, node.arc) {
                (Some(p), _) => writeln!(f, "{n} -> {p} (w {})", node.weight)?,
                (None, Some(arc)) => writeln!(f, "{n} root [{arc}]")?,
                (None, None) => writeln!(f, "{n} root")?,
            }
        }
        Ok(())
    }
}

impl<W> fmt::Debug for DynamicForest<W>
where
    W: Copy + Ord + Default + Send + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(|n| *n.lock()))
            .finish()
    }
}
