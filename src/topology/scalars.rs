//! Scalar fields and the total vertex order used by the sweep.
//!
//! Equal scalar values are disambiguated by an optional per-vertex offset
//! (simulation of simplicity) and finally by vertex id, so every pair of
//! distinct vertices compares strictly.

use std::cmp::Ordering;

use num_traits::Float;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::reeb_error::ReebError;

/// Direction in which the sweep visits the vertex order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SweepDirection {
    /// From minima towards maxima.
    #[default]
    Ascending,
    /// From maxima towards minima.
    Descending,
}

impl SweepDirection {
    pub fn reversed(self) -> Self {
        match self {
            SweepDirection::Ascending => SweepDirection::Descending,
            SweepDirection::Descending => SweepDirection::Ascending,
        }
    }
}

/// One scalar value per mesh vertex.
#[derive(Debug, Clone)]
pub struct ScalarField<T> {
    values: Vec<T>,
    offsets: Option<Vec<usize>>,
}

impl<T> ScalarField<T>
where
    T: Float + Send + Sync,
{
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            offsets: None,
        }
    }

    /// Attach tie-breaking offsets, one per vertex.
    pub fn with_offsets(mut self, offsets: Vec<usize>) -> Result<Self, ReebError> {
        if offsets.len() != self.values.len() {
            return Err(ReebError::OffsetLengthMismatch {
                expected: self.values.len(),
                found: offsets.len(),
            });
        }
        self.offsets = Some(offsets);
        Ok(self)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn value(&self, v: usize) -> T {
        self.values[v]
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    fn offset(&self, v: usize) -> usize {
        self.offsets.as_ref().map_or(v, |o| o[v])
    }

    /// Strict total order on vertices: value, then offset, then id.
    ///
    /// Values must be comparable; see [`ScalarField::order`].
    pub fn compare(&self, a: usize, b: usize) -> Ordering {
        self.values[a]
            .partial_cmp(&self.values[b])
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.offset(a).cmp(&self.offset(b)))
            .then_with(|| a.cmp(&b))
    }

    /// `true` if `a` comes strictly before `b` in ascending order.
    #[inline]
    pub fn is_lower(&self, a: usize, b: usize) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Rank every vertex in the given sweep direction.
    pub fn order(&self, direction: SweepDirection) -> Result<VertexOrder, ReebError> {
        if let Some(v) = self.values.iter().position(|x| x.is_nan()) {
            return Err(ReebError::NonFiniteScalar(v));
        }
        let mut sorted: Vec<usize> = (0..self.values.len()).collect();
        match direction {
            SweepDirection::Ascending => sorted.par_sort_unstable_by(|&a, &b| self.compare(a, b)),
            SweepDirection::Descending => sorted.par_sort_unstable_by(|&a, &b| self.compare(b, a)),
        }
        Ok(VertexOrder::from_sorted(sorted, direction))
    }
}

/// Position of every vertex along the sweep.
///
/// Rank 0 is visited first. "Lower" and "upper" always refer to the sweep,
/// so for a descending sweep the lower neighbours have larger scalar values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexOrder {
    rank: Vec<usize>,
    sorted: Vec<usize>,
    direction: SweepDirection,
}

impl VertexOrder {
    /// Build from vertices listed in sweep order.
    pub fn from_sorted(sorted: Vec<usize>, direction: SweepDirection) -> Self {
        let mut rank = vec![0usize; sorted.len()];
        for (r, &v) in sorted.iter().enumerate() {
            rank[v] = r;
        }
        Self {
            rank,
            sorted,
            direction,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    #[inline]
    pub fn rank(&self, v: usize) -> usize {
        self.rank[v]
    }

    #[inline]
    pub fn vertex_at(&self, rank: usize) -> usize {
        self.sorted[rank]
    }

    #[inline]
    pub fn is_lower(&self, a: usize, b: usize) -> bool {
        self.rank[a] < self.rank[b]
    }

    pub fn direction(&self) -> SweepDirection {
        self.direction
    }

    /// Vertices in sweep order.
    pub fn sorted(&self) -> &[usize] {
        &self.sorted
    }
}
