//! Utilities shared by `hypergroup`.

#[macro_use]
mod macros;
pub mod error;
pub mod ti;
