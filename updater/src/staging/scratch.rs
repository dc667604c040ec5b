//! Scratch workspace lifecycle.
//!
//! The scratch workspace holds downloaded archives and extracted package
//! trees between the fetch and merge steps. It is created lazily, may be
//! left partially populated by an interrupted run, and can be removed at
//! any time without affecting the destination.

use crate::error::{Result, UpdaterError};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io::Write;

use crate::output::write_stderr_line;

/// A process-owned scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchWorkspace {
    root: Utf8PathBuf,
}

impl ScratchWorkspace {
    /// Create a handle for the scratch directory at `root`. Nothing is
    /// created on disk until [`ScratchWorkspace::ensure`] is called.
    #[must_use]
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    /// Return the scratch directory path.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Create the scratch directory if absent.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Filesystem`] if the directory cannot be
    /// created.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| UpdaterError::filesystem(&self.root, e))
    }

    /// Location of a downloaded archive named `filename`.
    #[must_use]
    pub fn archive_path(&self, filename: &str) -> Utf8PathBuf {
        self.root.join(filename)
    }

    /// Location of an extracted package directory named `name`.
    #[must_use]
    pub fn package_dir(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Remove a stale package directory left behind by an earlier run.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Filesystem`] if the directory exists but
    /// cannot be removed.
    pub fn clear_package(&self, name: &str) -> Result<()> {
        let dir = self.package_dir(name);
        if !dir.exists() {
            return Ok(());
        }
        debug!("removing stale staged package {dir}");
        fs::remove_dir_all(&dir).map_err(|e| UpdaterError::filesystem(&dir, e))
    }

    /// Delete the extracted package directory after a merge, announcing the
    /// removal on `status`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Filesystem`] if the directory cannot be
    /// removed.
    pub fn discard_package(&self, name: &str, status: &mut dyn Write) -> Result<()> {
        let dir = self.package_dir(name);
        if !dir.exists() {
            return Ok(());
        }
        write_stderr_line(status, format!("Removing {dir}"));
        fs::remove_dir_all(&dir).map_err(|e| UpdaterError::filesystem(&dir, e))
    }
}
