//! Structural self-checks for the forest and the skeleton.
//!
//! Checks are cheap enough for tests but walk every node, so the hot paths
//! only call them through [`debug_invariants!`], which compiles to nothing in
//! release builds unless the `check-invariants` feature is enabled.

use crate::reeb_error::ReebError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), ReebError>;

    /// Panic on the first violated invariant when checking is enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "DebugInvariants");
    }
}

/// Run a fallible check and panic with context on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
