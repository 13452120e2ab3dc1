//! Node record of the dynamic forest.

use serde::{Deserialize, Serialize};

use crate::skeleton::ArcId;

/// One node of the preimage forest.
///
/// `weight` is the weight of the edge to `parent` and is meaningless on a
/// root. `arc` is only meaningful on a root: it names the skeleton arc whose
/// contour the whole tree currently represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestNode<W> {
    pub parent: Option<usize>,
    pub weight: W,
    pub child_count: u32,
    pub arc: Option<ArcId>,
}

impl<W: Default> Default for ForestNode<W> {
    fn default() -> Self {
        Self {
            parent: None,
            weight: W::default(),
            child_count: 0,
            arc: None,
        }
    }
}

impl<W> ForestNode<W> {
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_node_is_isolated_root() {
        let n = ForestNode::<usize>::default();
        assert!(n.is_root());
        assert_eq!(n.child_count, 0);
        assert_eq!(n.arc, None);
    }
}
