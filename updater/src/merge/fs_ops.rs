//! Filesystem operations used by the merge engine.

use camino::Utf8Path;
use log::debug;
use std::fs;
use std::io;

/// Filesystem primitives the merge engine relies on.
#[cfg_attr(test, mockall::automock)]
pub trait FileOps {
    /// Return true when something occupies `path` (including dangling
    /// symlinks).
    fn exists(&self, path: &Utf8Path) -> bool;

    /// Remove whatever occupies `path`: recursively for directories, a
    /// plain unlink otherwise.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn remove(&self, path: &Utf8Path) -> io::Result<()>;

    /// Move the file or directory at `from` to `to`, which must not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn move_entry(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()>;
}

/// [`FileOps`] backed by `std::fs`.
///
/// Moves try a rename first and fall back to copy-then-delete when the
/// rename crosses filesystems.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn exists(&self, path: &Utf8Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn remove(&self, path: &Utf8Path) -> io::Result<()> {
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }

    fn move_entry(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
        relocate(from, to, |a, b| fs::rename(a, b), copy_recursive)
    }
}

/// Rename `from` to `to`, copying then deleting when the rename crosses a
/// filesystem boundary. A failed copy leaves nothing behind at `to`.
fn relocate(
    from: &Utf8Path,
    to: &Utf8Path,
    rename: impl FnOnce(&Utf8Path, &Utf8Path) -> io::Result<()>,
    copy: impl FnOnce(&Utf8Path, &Utf8Path) -> io::Result<()>,
) -> io::Result<()> {
    match rename(from, to) {
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            debug!("rename {from} -> {to} crosses devices; copying instead");
            if let Err(copy_err) = copy(from, to) {
                if StdFileOps.exists(to) {
                    StdFileOps.remove(to).unwrap_or_else(|cleanup_err| {
                        debug!("could not remove partial copy {to}: {cleanup_err}");
                    });
                }
                return Err(copy_err);
            }
            StdFileOps.remove(from)
        }
        other => other,
    }
}

fn copy_recursive(from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(from)?;
    if metadata.is_dir() {
        fs::create_dir(to)?;
        for entry in from.read_dir_utf8()? {
            let entry = entry?;
            copy_recursive(entry.path(), &to.join(entry.file_name()))?;
        }
        fs::set_permissions(to, metadata.permissions())
    } else if metadata.file_type().is_symlink() {
        copy_symlink(from, to)
    } else {
        fs::copy(from, to).map(|_| ())
    }
}

#[cfg(unix)]
fn copy_symlink(from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(from)?, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}
