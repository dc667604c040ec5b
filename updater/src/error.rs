//! Error types for the drupdate updater.
//!
//! This module defines the fatal error taxonomy surfaced to the operator.
//! Recoverable conditions (integrity mismatches and per-entry lock failures)
//! are modelled as values elsewhere and never appear here.

use crate::release::catalog::CatalogError;
use crate::release::download::DownloadError;
use crate::staging::extraction::ExtractionError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort an updater invocation.
#[derive(Debug, Error)]
pub enum UpdaterError {
    /// The archive could not be opened, read, or does not have the expected
    /// single package root.
    #[error("invalid archive {archive}: {source}")]
    ArchiveFormat {
        /// Path to the rejected archive.
        archive: Utf8PathBuf,
        /// The extraction failure.
        #[source]
        source: ExtractionError,
    },

    /// A root directory (scratch workspace or destination) could not be
    /// created or written.
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        /// The path that could not be created or written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The requested version is absent from the release catalog.
    #[error("version {version} not available")]
    VersionNotFound {
        /// The requested version identifier.
        version: String,
    },

    /// The operator declined to install a release flagged as insecure.
    #[error("installation of insecure release {version} declined")]
    InsecureReleaseDeclined {
        /// The insecure version identifier.
        version: String,
    },

    /// No destination directory was supplied or entered.
    #[error("no installation location given")]
    NoDestination,

    /// The release catalog could not be fetched or parsed.
    #[error("release catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    /// A release archive could not be fetched.
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration {path}: {reason}")]
    Config {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl UpdaterError {
    /// Build a [`UpdaterError::Filesystem`] for `path`.
    #[must_use]
    pub fn filesystem(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Return true when the error reflects an operator decision rather than
    /// a failure.
    #[must_use]
    pub fn is_operator_abort(&self) -> bool {
        matches!(self, Self::InsecureReleaseDeclined { .. })
    }
}

/// Result type alias using [`UpdaterError`].
pub type Result<T> = std::result::Result<T, UpdaterError>;
