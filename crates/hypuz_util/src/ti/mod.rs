//! Typed index collections.
//!
//! When handling many different kinds of indexes (element indexes, generator
//! indexes, coset indexes, ...) it's useful to wrap them in newtypes to avoid
//! accidentally indexing a collection using the wrong index. This module
//! provides a trait for such newtype wrappers ("typed indexes"), a helper
//! macro for defining them, and collections built on top of them:
//!
//! - value per index: [`TiVec`]
//! - fixed-column, growable-row table of values, one per `(row, column)` pair:
//!   [`Grid`]

pub use tinyset::Fits64;

mod grid;
mod index;
pub mod vec;

pub use grid::Grid;
pub use index::{TypedIndex, TypedIndexIter};
pub use vec::TiVec;

pub use crate::error::{IndexOutOfRange, IndexOverflow};

/// Sentinel representing the absence of an index. Prefer `Option<I>` at API
/// boundaries; this constant exists for the rare case where the sentinel must
/// be stored in-line as a `usize` (e.g. columns of a [`Grid`] shared with
/// external code that hasn't been converted to `Option`).
pub const SENTINEL: usize = usize::MAX;
