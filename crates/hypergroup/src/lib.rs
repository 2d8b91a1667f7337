//! Computational group/semigroup theory: closure-based enumeration of
//! finitely generated semigroups and monoids, and Todd-Coxeter coset
//! enumeration of finitely presented congruences on them.
//!
//! The two engines are independent and share no code, but compose: a
//! [`Congruence`] can be seeded either from a presentation alone or from the
//! Cayley tables of an already-enumerated [`Semigroup`].

#![allow(clippy::too_many_arguments)]

mod element;
mod error;
pub mod congruence;
pub mod semigroup;

pub use congruence::{cong_pairs_enumerate, parallel_todd_coxeter, Congruence, CongruenceKind, CosetId};
pub use element::Element;
pub use error::{CongruenceError, EnumerationError};
pub use semigroup::{Relation, RelationIter, Semigroup};
