//! Merging a staged package into a live installation.
//!
//! - [`protection`] - names that survive a default merge
//! - [`decision`] - per-entry outcomes and the run report
//! - [`fs_ops`] - filesystem primitives behind a mockable trait
//! - [`engine`] - the merge policy itself

pub mod decision;
pub mod engine;
pub mod fs_ops;
pub mod protection;
