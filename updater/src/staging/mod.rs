//! Archive staging: extraction, scratch workspace, and the stager.
//!
//! # Sub-modules
//!
//! - [`extraction`] - gzip tar extraction with path traversal protection.
//! - [`scratch`] - Scratch workspace lifecycle.
//! - [`stager`] - Staging of an archive's package directory for merging.

pub mod extraction;
pub mod scratch;
pub mod stager;
