//! ReebError: Unified error type for reeb-sweep public APIs
//!
//! Usage errors (building before the mesh is prepared, mismatched field
//! lengths) are reported here instead of panicking. Structural no-ops of the
//! dynamic forest are *not* errors and never surface through this type.

use thiserror::Error;

/// Unified error type for Reeb graph construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReebError {
    /// `build` was called before the mesh adjacency was preprocessed.
    #[error("mesh adjacency is not prepared: call `preprocess()` before building")]
    MeshNotPrepared,
    /// The scalar field does not provide one value per mesh vertex.
    #[error("scalar field has {found} values, mesh has {expected} vertices")]
    ScalarLengthMismatch { expected: usize, found: usize },
    /// The simulation-of-simplicity offsets do not match the field length.
    #[error("offset array has {found} entries, scalar field has {expected} values")]
    OffsetLengthMismatch { expected: usize, found: usize },
    /// A scalar value cannot be totally ordered (NaN).
    #[error("scalar value at vertex {0} is not comparable (NaN)")]
    NonFiniteScalar(usize),
    /// A cell references a vertex outside `0..vertex_count`.
    #[error("cell {cell} references vertex {vertex}, mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        cell: usize,
        vertex: usize,
        vertex_count: usize,
    },
    /// A cell repeats one of its vertices.
    #[error("cell {0} is degenerate (repeated vertex)")]
    DegenerateCell(usize),
    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
    /// The sweep ended with parked propagations or unconsumed seeds.
    #[error("sweep did not terminate cleanly: {pending_saddles} saddle(s) pending, {remaining_seeds} seed(s) unconsumed")]
    UnfinishedSweep {
        pending_saddles: usize,
        remaining_seeds: usize,
    },
    /// A mesh generator was given unusable dimensions.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A structural invariant of the forest or skeleton does not hold.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl ReebError {
    /// Negative status code for callers that consume integer statuses.
    pub fn status_code(&self) -> i32 {
        match self {
            ReebError::MeshNotPrepared => -1,
            ReebError::ScalarLengthMismatch { .. } => -2,
            ReebError::OffsetLengthMismatch { .. } => -3,
            ReebError::NonFiniteScalar(_) => -4,
            ReebError::VertexOutOfRange { .. } => -5,
            ReebError::DegenerateCell(_) => -6,
            ReebError::ThreadPool(_) => -7,
            ReebError::UnfinishedSweep { .. } => -8,
            ReebError::InvariantViolation(_) => -9,
            ReebError::InvalidGeometry(_) => -10,
        }
    }
}
