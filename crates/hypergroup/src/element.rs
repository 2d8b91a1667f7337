//! The abstract element contract shared by both engines.
//!
//! Concrete element kinds (transformations, partial permutations,
//! bipartitions, boolean matrices, matrices over semirings, projective
//! max-plus matrices, partitioned binary relations, ...) are external
//! collaborators: this crate never constructs one directly, only holds,
//! hashes, orders, and multiplies them through this trait.

use std::hash::Hash;

/// A finite-degree algebraic element supporting the operations the
/// enumeration engine needs: equality, a total order (for short-lex
/// tie-breaking and canonical Cayley tables), hashing, an identity, and an
/// in-place associative product.
///
/// # Laws
///
/// Implementations must satisfy, for all `a`, `b`, `c` of equal degree:
/// - `a.multiply_into_result(&b)` computes the same element regardless of how
///   the caller associates a longer product (associativity is assumed, never
///   checked).
/// - `Self::identity(a.degree())` is a two-sided identity for every element
///   of that degree.
/// - equality, hashing and ordering agree with one another (the usual `Eq`
///   and `Ord` consistency requirements).
pub trait Element: Clone + Eq + Hash + Ord {
    /// Size parameter of the element (domain cardinality, matrix dimension,
    /// twice the partition support, ...). All generators handed to a single
    /// [`crate::Semigroup`] must share the same degree.
    fn degree(&self) -> usize;

    /// Cost model used to decide between multiplying two elements outright
    /// and tracing a product through the Cayley graph. Larger is more
    /// expensive.
    fn complexity(&self) -> usize;

    /// Returns the two-sided identity element of the given degree.
    fn identity(degree: usize) -> Self;

    /// Writes `a * b` into `self`. `self` must not alias `a` or `b`.
    fn multiply_into(&mut self, a: &Self, b: &Self);

    /// Returns a deep copy of `self` whose degree is `extra_degree` larger,
    /// extended in whatever identity-preserving way is natural for the
    /// concrete type (e.g. a transformation fixes the new points; a partial
    /// permutation leaves them undefined). Implementation-defined when the
    /// element-kind has no canonical extension (see the crate's design
    /// notes); called only by [`crate::Semigroup::clone_and_add`] and only
    /// when `extra_degree > 0`.
    fn deep_clone_extend(&self, extra_degree: usize) -> Self;

    /// Convenience wrapper around [`Element::multiply_into`] that allocates
    /// the destination as a clone of `self`'s identity. Prefer
    /// `multiply_into` with a reused scratch buffer on any hot path.
    fn multiplied_by(&self, other: &Self) -> Self {
        let mut out = Self::identity(self.degree());
        out.multiply_into(self, other);
        out
    }
}
