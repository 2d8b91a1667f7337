//! Recoverable error types for the enumeration and congruence engines.
//!
//! Programmer errors (out-of-range generator letters, zero batch size,
//! multiplying into an operand) are assertion-class preconditions and panic
//! via `assert!`/`debug_assert!` rather than being encoded here; see the
//! module docs on [`crate::Semigroup`] and [`crate::Congruence`].

/// Recoverable error from the enumeration engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumerationError {
    /// `Semigroup::new` was called with no generators.
    #[error("generator list must not be empty")]
    EmptyGenerators,
    /// `at`/`sorted_at` was called with an index beyond the (now fully known)
    /// size of the semigroup.
    #[error("index {index} out of range (semigroup has only {size} elements)")]
    OutOfRange {
        /// The index that was requested.
        index: usize,
        /// The eventual size of the semigroup.
        size: usize,
    },
    /// `position`/`position_sorted` was called with an element that does not
    /// belong to the semigroup.
    #[error("element not present in the enumerated semigroup")]
    NotPresent,
    /// `clone_and_add` was given a generator of smaller degree than the
    /// semigroup's existing degree; degree can only grow.
    #[error("new generator has degree {new}, smaller than the existing degree {existing}")]
    DegreeMismatch {
        /// Degree of the existing semigroup.
        existing: usize,
        /// Degree of the offending new generator.
        new: usize,
    },
}

/// Recoverable error from the congruence (Todd-Coxeter) engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CongruenceError {
    /// The operation was abandoned because [`crate::Congruence`]'s `stop`
    /// flag was set (typically by a sibling in [`crate::parallel_todd_coxeter`]).
    #[error("coset enumeration was cancelled")]
    Cancelled,
}
