//! Orchestration of the list, download and install flows.
//!
//! Every collaborator is injected through [`Services`], so the binary wires
//! in HTTP, gzip tar and `std::fs` implementations while tests substitute
//! mocks or temporary trees.

use crate::error::{Result, UpdaterError};
use crate::merge::decision::MergeReport;
use crate::merge::engine::MergeEngine;
use crate::merge::fs_ops::FileOps;
use crate::output::{DONE, write_stderr_line};
use crate::prompt::{InsecurePolicy, Prompter};
use crate::release::catalog::CatalogClient;
use crate::release::download::{FetchOutcome, Fetcher, HttpTransport};
use crate::release::record::{ReleaseCatalog, ReleaseRecord};
use crate::release::verification::{VerificationOutcome, verify_archive};
use crate::staging::extraction::ArchiveExtractor;
use crate::staging::scratch::ScratchWorkspace;
use crate::staging::stager::Stager;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::io::Write;

/// Collaborators used by the [`Updater`].
#[derive(Clone, Copy)]
pub struct Services<'a> {
    /// Release history source.
    pub catalog: &'a dyn CatalogClient,
    /// Transport used to fetch archives.
    pub transport: &'a dyn HttpTransport,
    /// Archive reader for staging.
    pub extractor: &'a dyn ArchiveExtractor,
    /// Filesystem primitives for merging.
    pub file_ops: &'a dyn FileOps,
}

/// Merge behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Replace protected entries too.
    pub replace_all: bool,
    /// Keep the extracted package in the scratch workspace afterwards.
    pub keep_extract: bool,
}

/// A release that passed the integrity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedArchive {
    /// Location of the archive in the scratch workspace.
    pub path: Utf8PathBuf,
    /// Whether the archive was fetched or reused.
    pub fetch: FetchOutcome,
}

/// Result of the combined download and install flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The package was merged into the destination.
    Merged(MergeReport),
    /// The archive failed verification and was deleted; nothing was merged.
    IntegrityMismatch,
}

/// Drives catalog lookup, fetching, verification, staging and merging.
pub struct Updater<'a> {
    services: Services<'a>,
    scratch: ScratchWorkspace,
}

impl<'a> Updater<'a> {
    /// Create an updater staging into `scratch`.
    #[must_use]
    pub fn new(services: Services<'a>, scratch: ScratchWorkspace) -> Self {
        Self { services, scratch }
    }

    /// The scratch workspace in use.
    #[must_use]
    pub fn scratch(&self) -> &ScratchWorkspace {
        &self.scratch
    }

    /// Fetch the catalog, optionally limited to the newest `limit` versions.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Catalog`] when the feed cannot be fetched or
    /// parsed.
    pub fn list_versions(&self, limit: Option<usize>) -> Result<ReleaseCatalog> {
        Ok(self.services.catalog.list_versions(limit)?)
    }

    /// Look up `version`, or the newest release when `None`, and apply the
    /// insecure-release policy.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::VersionNotFound`] for unknown versions or an
    /// empty catalog, and [`UpdaterError::InsecureReleaseDeclined`] when the
    /// policy refuses an insecure release.
    pub fn resolve_release(
        &self,
        version: Option<&str>,
        policy: InsecurePolicy,
        prompter: &mut dyn Prompter,
    ) -> Result<ReleaseRecord> {
        let catalog = self.list_versions(None)?;
        let record = match version {
            Some(wanted) => catalog.get(wanted),
            None => catalog.latest(),
        }
        .cloned()
        .ok_or_else(|| UpdaterError::VersionNotFound {
            version: version.unwrap_or("latest").to_owned(),
        })?;

        if record.is_insecure() && !policy.permits(&record.version, prompter) {
            return Err(UpdaterError::InsecureReleaseDeclined {
                version: record.version,
            });
        }
        debug!("resolved release {} ({})", record.version, record.security);
        Ok(record)
    }

    /// Fetch the archive for `record` into the scratch workspace and verify
    /// it against the published digest.
    ///
    /// Returns `Ok(None)` on a digest mismatch; the archive has then been
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Download`] when the transfer fails and
    /// [`UpdaterError::Filesystem`] when the scratch workspace or archive
    /// cannot be accessed.
    pub fn download_release(
        &self,
        record: &ReleaseRecord,
        status: &mut dyn Write,
    ) -> Result<Option<VerifiedArchive>> {
        self.scratch.ensure()?;
        let path = self.scratch.archive_path(record.filename());
        if !path.exists() {
            write_stderr_line(status, format!("Downloading {}", record.filename()));
        }
        let fetch = Fetcher::new(self.services.transport).fetch(&record.url, &path)?;
        if fetch == FetchOutcome::UsedLocal {
            write_stderr_line(status, "Using local file.");
        }

        write_stderr_line(status, "Verifying package authenticity.");
        match verify_archive(&path, &record.digest).map_err(|e| UpdaterError::filesystem(&path, e))? {
            VerificationOutcome::Verified => {
                write_stderr_line(status, "Package authenticity established");
                Ok(Some(VerifiedArchive { path, fetch }))
            }
            VerificationOutcome::Mismatch { .. } => {
                write_stderr_line(status, "Warning! Hash Mismatch");
                write_stderr_line(status, format!("Removing {path}"));
                Ok(None)
            }
        }
    }

    /// Stage `archive` and merge it into `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::ArchiveFormat`] for unusable archives and
    /// [`UpdaterError::Filesystem`] when the scratch workspace or
    /// destination root cannot be prepared. Per-entry failures appear in
    /// the returned report instead.
    pub fn install_archive(
        &self,
        archive: &Utf8Path,
        destination: &Utf8Path,
        options: InstallOptions,
        status: &mut dyn Write,
    ) -> Result<MergeReport> {
        write_stderr_line(status, format!("Installing into {destination}"));
        let staged = Stager::new(&self.scratch, self.services.extractor).stage(archive, destination)?;
        let report = MergeEngine::new(self.services.file_ops).apply(
            &staged,
            destination,
            options.replace_all,
            status,
        )?;

        if options.keep_extract {
            debug!("keeping extracted package at {}", staged.root);
        } else {
            self.scratch.discard_package(&staged.name, status)?;
        }
        info!("{}", report.summary_line());
        write_stderr_line(status, DONE);
        Ok(report)
    }

    /// Resolve, fetch, verify and install a release.
    ///
    /// The destination is requested from `prompter` only after the archive
    /// is verified.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::resolve_release`],
    /// [`Self::download_release`] and [`Self::install_archive`], plus
    /// [`UpdaterError::NoDestination`] when no destination is supplied.
    pub fn download_and_install(
        &self,
        version: Option<&str>,
        destination: Option<&Utf8Path>,
        policy: InsecurePolicy,
        options: InstallOptions,
        prompter: &mut dyn Prompter,
        status: &mut dyn Write,
    ) -> Result<InstallOutcome> {
        let record = self.resolve_release(version, policy, prompter)?;
        let Some(archive) = self.download_release(&record, status)? else {
            return Ok(InstallOutcome::IntegrityMismatch);
        };
        let destination = match destination {
            Some(dir) => dir.to_owned(),
            None => prompter.destination()?,
        };
        self.install_archive(&archive.path, &destination, options, status)
            .map(InstallOutcome::Merged)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
