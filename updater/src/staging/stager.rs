//! Archive staging ahead of a merge.
//!
//! The stager prepares the scratch workspace and destination, extracts the
//! release archive, and enumerates the immediate children of the package
//! directory. Those children are the units the merge engine moves or
//! replaces as whole subtrees.

use super::extraction::{ArchiveExtractor, ExtractionError};
use super::scratch::ScratchWorkspace;
use crate::error::{Result, UpdaterError};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// An extracted package ready for merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPackage {
    /// Name of the package directory inside the scratch workspace.
    pub name: String,
    /// Full path to the package directory.
    pub root: Utf8PathBuf,
    /// Immediate children of the package directory, sorted by name.
    pub entries: Vec<String>,
}

impl StagedPackage {
    /// Path of a staged top-level entry.
    #[must_use]
    pub fn entry_path(&self, entry: &str) -> Utf8PathBuf {
        self.root.join(entry)
    }
}

/// Handles staging of release archives into the scratch workspace.
pub struct Stager<'a> {
    scratch: &'a ScratchWorkspace,
    extractor: &'a dyn ArchiveExtractor,
}

impl<'a> Stager<'a> {
    /// Create a stager over `scratch` using `extractor`.
    #[must_use]
    pub fn new(scratch: &'a ScratchWorkspace, extractor: &'a dyn ArchiveExtractor) -> Self {
        Self { scratch, extractor }
    }

    /// Stage `archive` for merging into `destination_root`.
    ///
    /// The archive is inspected before anything is written, so a malformed
    /// archive never leaves the destination modified. A package directory
    /// left behind by an interrupted run is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::ArchiveFormat`] for unreadable or
    /// ill-formed archives and [`UpdaterError::Filesystem`] when the scratch
    /// workspace or destination cannot be created.
    pub fn stage(&self, archive: &Utf8Path, destination_root: &Utf8Path) -> Result<StagedPackage> {
        let name = self
            .extractor
            .package_root(archive)
            .map_err(|source| archive_error(archive, source))?;

        self.scratch.ensure()?;
        fs::create_dir_all(destination_root)
            .map_err(|e| UpdaterError::filesystem(destination_root, e))?;
        self.scratch.clear_package(&name)?;

        debug!("extracting {archive} into {}", self.scratch.root());
        self.extractor
            .extract(archive, self.scratch.root())
            .map_err(|source| match source {
                ExtractionError::Io(io) => UpdaterError::filesystem(self.scratch.root(), io),
                other => archive_error(archive, other),
            })?;

        let root = self.scratch.package_dir(&name);
        let entries = list_entries(&root)?;
        Ok(StagedPackage {
            name,
            root,
            entries,
        })
    }
}

fn archive_error(archive: &Utf8Path, source: ExtractionError) -> UpdaterError {
    UpdaterError::ArchiveFormat {
        archive: archive.to_owned(),
        source,
    }
}

fn list_entries(root: &Utf8Path) -> Result<Vec<String>> {
    let mut entries = root
        .read_dir_utf8()
        .and_then(|dir| {
            dir.map(|entry| entry.map(|e| e.file_name().to_owned()))
                .collect::<std::io::Result<Vec<_>>>()
        })
        .map_err(|e| UpdaterError::filesystem(root, e))?;
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
#[path = "stager_tests.rs"]
mod tests;
