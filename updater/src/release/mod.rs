//! Release catalog, retrieval, and integrity verification.
//!
//! # Sub-modules
//!
//! - [`catalog`] - Release-history XML parsing and the catalog client.
//! - [`download`] - HTTP transport seam and the idempotent fetcher.
//! - [`md5_digest`] - MD5 digest newtype (`Md5Digest`).
//! - [`record`] - Release records and the ordered catalog.
//! - [`verification`] - Whole-file digest verification.

pub mod catalog;
pub mod download;
pub mod md5_digest;
pub mod record;
pub mod verification;
