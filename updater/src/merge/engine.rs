//! The merge engine.
//!
//! Each staged top-level entry is handled independently:
//!
//! 1. Absent at the destination: move it in.
//! 2. Present and `replace_all`: remove the existing path, then move in.
//! 3. Present, not `replace_all`, protected name: leave it alone.
//! 4. Present, not `replace_all`, unprotected: remove then move in.
//!
//! A failure removing or moving one entry is recorded as
//! [`MergeDecision::SkipLocked`] and processing continues with the next
//! entry. Only failure to create the destination root aborts the merge.

use super::decision::{MergeDecision, MergeReport};
use super::fs_ops::FileOps;
use super::protection::ProtectionSet;
use crate::error::{Result, UpdaterError};
use crate::output::write_stderr_line;
use crate::staging::stager::StagedPackage;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use std::io::{self, Write};

/// Failure to remove or move a single destination entry.
#[derive(Debug, thiserror::Error)]
pub enum EntryLockError {
    /// The existing destination path could not be removed.
    #[error("could not remove {path}: {source}")]
    Remove {
        /// The destination path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The staged entry could not be moved into place.
    #[error("could not move {from} to {to}: {source}")]
    Move {
        /// The staged source path.
        from: Utf8PathBuf,
        /// The destination path.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Applies the merge policy to staged packages.
pub struct MergeEngine<'a> {
    ops: &'a dyn FileOps,
    protection: ProtectionSet,
}

impl<'a> MergeEngine<'a> {
    /// Create an engine over the given filesystem operations.
    #[must_use]
    pub fn new(ops: &'a dyn FileOps) -> Self {
        Self {
            ops,
            protection: ProtectionSet,
        }
    }

    /// Merge every entry of `staged` into `destination_root`.
    ///
    /// Status lines are written to `status` as each entry is processed.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Filesystem`] only when `destination_root`
    /// cannot be created; per-entry failures are reported, not raised.
    pub fn apply(
        &self,
        staged: &StagedPackage,
        destination_root: &Utf8Path,
        replace_all: bool,
        status: &mut dyn Write,
    ) -> Result<MergeReport> {
        std::fs::create_dir_all(destination_root)
            .map_err(|e| UpdaterError::filesystem(destination_root, e))?;

        let mut report = MergeReport::default();
        for entry in &staged.entries {
            let source = staged.entry_path(entry);
            let decision = self
                .merge_entry(&source, destination_root, entry, replace_all, status)
                .unwrap_or_else(|err| {
                    warn!("{entry}: {err}");
                    MergeDecision::SkipLocked {
                        reason: err.to_string(),
                    }
                });
            debug!("{entry}: {decision}");
            report.record(entry.as_str(), decision);
            if let Some(outcome) = report.outcomes().last() {
                write_stderr_line(status, outcome.status_line());
            }
        }
        Ok(report)
    }

    fn merge_entry(
        &self,
        source: &Utf8Path,
        destination_root: &Utf8Path,
        entry: &str,
        replace_all: bool,
        status: &mut dyn Write,
    ) -> std::result::Result<MergeDecision, EntryLockError> {
        let destination = destination_root.join(entry);

        if !self.ops.exists(&destination) {
            self.move_into_place(source, &destination)?;
            return Ok(MergeDecision::MoveIn);
        }

        if !replace_all && self.protection.contains(entry) {
            return Ok(MergeDecision::SkipProtected);
        }

        write_stderr_line(status, format!("Removing {destination}"));
        self.ops
            .remove(&destination)
            .map_err(|source_err| EntryLockError::Remove {
                path: destination.clone(),
                source: source_err,
            })?;
        self.move_into_place(source, &destination)?;
        Ok(MergeDecision::Replace)
    }

    fn move_into_place(
        &self,
        source: &Utf8Path,
        destination: &Utf8Path,
    ) -> std::result::Result<(), EntryLockError> {
        self.ops
            .move_entry(source, destination)
            .map_err(|err| EntryLockError::Move {
                from: source.to_owned(),
                to: destination.to_owned(),
                source: err,
            })
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
