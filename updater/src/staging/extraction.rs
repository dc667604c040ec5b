//! Archive extraction for release packages.
//!
//! Release packages are gzip-compressed tarballs whose entries all live
//! under a single package directory (for example `drupal-7.98/`). Archives
//! are read twice: a validating pass that determines the package root and
//! rejects unsafe paths without touching the disk, then the unpacking pass.

use camino::{Utf8Component, Utf8Path};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io;
use std::path::Path;

/// Trait for extracting release archives, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Return the name of the single top-level directory of the archive.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] when the archive is unreadable, empty,
    /// contains unsafe paths, or has more than one top-level entry.
    fn package_root(&self, archive_path: &Utf8Path) -> Result<String, ExtractionError>;

    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Malformed`] when the archive stream cannot
    /// be decoded and [`ExtractionError::Io`] when writing fails.
    fn extract(&self, archive_path: &Utf8Path, dest_dir: &Utf8Path)
    -> Result<(), ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The archive stream could not be decoded as gzip-compressed tar.
    #[error("archive is not a readable tar.gz stream: {0}")]
    Malformed(#[source] io::Error),

    /// Writing extracted files failed.
    #[error("extraction I/O error: {0}")]
    Io(#[source] io::Error),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// A symlink or hard link points outside the package tree.
    #[error("link {path} points outside the archive: {target}")]
    UnsafeLink {
        /// The link entry's own path.
        path: String,
        /// The link target recorded in the archive.
        target: String,
    },

    /// A path in the archive is not valid UTF-8.
    #[error("non UTF-8 path in archive: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// The archive contains no entries.
    #[error("archive contains no entries")]
    EmptyArchive,

    /// The archive has more than one top-level entry.
    #[error("expected a single package directory, found {first} and {second}")]
    MultipleRoots {
        /// The first top-level name seen.
        first: String,
        /// A conflicting top-level name.
        second: String,
    },

    /// The single top-level entry is not a directory.
    #[error("package root {name} is not a directory")]
    RootNotDirectory {
        /// The top-level name.
        name: String,
    },
}

/// Default extractor using the `tar` and `flate2` crates.
///
/// Entry paths and link targets are validated before anything is written,
/// and entries are unpacked with [`tar::Entry::unpack_in`], which refuses to
/// write through a parent that resolves outside the destination.
pub struct GzipTarExtractor;

impl ArchiveExtractor for GzipTarExtractor {
    fn package_root(&self, archive_path: &Utf8Path) -> Result<String, ExtractionError> {
        let mut archive = open_archive(archive_path).map_err(ExtractionError::Malformed)?;
        let mut root: Option<String> = None;
        let mut root_is_dir = false;

        for entry_result in archive.entries().map_err(ExtractionError::Malformed)? {
            let entry = entry_result.map_err(ExtractionError::Malformed)?;
            let entry_type = entry.header().entry_type();
            if entry_type.is_pax_global_extensions() || entry_type.is_pax_local_extensions() {
                continue;
            }
            let raw_path = entry.path().map_err(ExtractionError::Malformed)?;
            let path = utf8_entry_path(&raw_path)?;
            validate_entry_path(path)?;
            validate_link_target(&entry, path)?;

            let Some((top, nested)) = split_top_level(path) else {
                continue;
            };
            match &root {
                None => root = Some(top.to_owned()),
                Some(existing) if existing != top => {
                    return Err(ExtractionError::MultipleRoots {
                        first: existing.clone(),
                        second: top.to_owned(),
                    });
                }
                Some(_) => {}
            }
            root_is_dir |= nested || entry_type.is_dir();
        }

        let name = root.ok_or(ExtractionError::EmptyArchive)?;
        if !root_is_dir {
            return Err(ExtractionError::RootNotDirectory { name });
        }
        Ok(name)
    }

    fn extract(
        &self,
        archive_path: &Utf8Path,
        dest_dir: &Utf8Path,
    ) -> Result<(), ExtractionError> {
        let mut archive = open_archive(archive_path).map_err(ExtractionError::Malformed)?;

        for entry_result in archive.entries().map_err(ExtractionError::Malformed)? {
            let mut entry = entry_result.map_err(ExtractionError::Malformed)?;
            let entry_type = entry.header().entry_type();
            if entry_type.is_pax_global_extensions() || entry_type.is_pax_local_extensions() {
                continue;
            }
            let entry_path = {
                let raw_path = entry.path().map_err(ExtractionError::Malformed)?;
                let path = utf8_entry_path(&raw_path)?;
                validate_entry_path(path)?;
                validate_link_target(&entry, path)?;
                path.to_owned()
            };

            let unpacked = entry.unpack_in(dest_dir).map_err(ExtractionError::Io)?;
            if !unpacked {
                return Err(ExtractionError::PathTraversal {
                    path: entry_path.into_string(),
                });
            }
        }

        Ok(())
    }
}

fn open_archive(archive_path: &Utf8Path) -> io::Result<tar::Archive<GzDecoder<File>>> {
    let file = File::open(archive_path)?;
    Ok(tar::Archive::new(GzDecoder::new(file)))
}

fn utf8_entry_path(path: &Path) -> Result<&Utf8Path, ExtractionError> {
    Utf8Path::from_path(path).ok_or_else(|| ExtractionError::NonUtf8Path {
        path: path.to_string_lossy().into_owned(),
    })
}

/// Return the first normal component of `path` and whether anything
/// follows it.
fn split_top_level(path: &Utf8Path) -> Option<(&str, bool)> {
    let mut components = path.components().filter_map(|component| match component {
        Utf8Component::Normal(name) => Some(name),
        _ => None,
    });
    let top = components.next()?;
    Some((top, components.next().is_some()))
}

/// Validate that a tar entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Utf8Path) -> Result<(), ExtractionError> {
    if escapes_root(path) {
        return Err(ExtractionError::PathTraversal {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Reject symlink and hard-link entries whose target is absolute or climbs
/// with `..`.
fn validate_link_target<R: io::Read>(
    entry: &tar::Entry<'_, R>,
    path: &Utf8Path,
) -> Result<(), ExtractionError> {
    let entry_type = entry.header().entry_type();
    if !entry_type.is_symlink() && !entry_type.is_hard_link() {
        return Ok(());
    }
    let Some(target) = entry.link_name().map_err(ExtractionError::Malformed)? else {
        return Ok(());
    };
    let unsafe_link = || ExtractionError::UnsafeLink {
        path: path.to_string(),
        target: target.to_string_lossy().into_owned(),
    };
    let utf8_target = Utf8Path::from_path(&target).ok_or_else(unsafe_link)?;
    if escapes_root(utf8_target) {
        return Err(unsafe_link());
    }
    Ok(())
}

fn escapes_root(path: &Utf8Path) -> bool {
    path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Utf8Component::ParentDir | Utf8Component::RootDir | Utf8Component::Prefix(_)
            )
        })
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod tests;
