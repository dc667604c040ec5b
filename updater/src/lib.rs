//! drupdate library.
//!
//! This crate fetches Drupal 7 core releases, verifies them against the
//! published MD5 digest and merges them into an existing installation while
//! preserving site-specific data. It backs the `drupdate` CLI binary and can
//! be driven programmatically for testing.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Configuration defaults and TOML loading
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Fatal error taxonomy
//! - [`merge`] - Merge policy, decisions and filesystem seam
//! - [`output`] - Status lines and version listing
//! - [`pipeline`] - List, download and install orchestration
//! - [`prompt`] - Operator prompts and the insecure-release policy
//! - [`release`] - Release catalog, fetching and integrity verification
//! - [`staging`] - Archive extraction into the scratch workspace

pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod release;
pub mod staging;

#[cfg(test)]
pub(crate) mod test_utils;
