//! Test support utilities for updater behavioural tests.
//!
//! Provides a UTF-8 temporary sandbox and builders for release archives in
//! the layout published on drupal.org: a gzip tarball with a single package
//! directory at its root.

use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use tempfile::TempDir;

/// Files of a minimal core release, relative to the package root.
pub const CORE_FILES: &[(&str, &[u8])] = &[
    (".htaccess", b"stock rules"),
    ("CHANGELOG.txt", b"Drupal 7.98"),
    ("modules/node/node.module", b"new node"),
    ("sites/default/default.settings.php", b"stock settings"),
];

/// A temporary directory addressed through a UTF-8 path.
pub struct Sandbox {
    _temp: TempDir,
    pub root: Utf8PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let root =
            Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp dir path not UTF-8");
        Self { _temp: temp, root }
    }

    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent");
    }
    fs::write(path, contents).expect("failed to write file");
}

/// Build a gzip tarball from `(path, contents)` pairs; paths ending in `/`
/// become directory entries.
pub fn write_tar_gz(archive: &Utf8Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(archive).expect("failed to create archive");
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        if path.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
        } else {
            header.set_mode(0o644);
            header.set_size(contents.len() as u64);
        }
        header.set_cksum();
        builder
            .append_data(&mut header, path, *contents)
            .expect("failed to append entry");
    }
    builder
        .into_inner()
        .expect("failed to finish tar")
        .finish()
        .expect("failed to finish gzip");
}

/// Build a release tarball whose files live under `root/`.
pub fn write_package(archive: &Utf8Path, root: &str, files: &[(&str, &[u8])]) {
    let root_dir = format!("{root}/");
    let prefixed: Vec<(String, &[u8])> = files
        .iter()
        .map(|(path, contents)| (format!("{root}/{path}"), *contents))
        .collect();
    let mut entries: Vec<(&str, &[u8])> = vec![(root_dir.as_str(), &b""[..])];
    entries.extend(prefixed.iter().map(|(path, contents)| (path.as_str(), *contents)));
    write_tar_gz(archive, &entries);
}

/// True when the current process can ignore directory permissions.
#[cfg(unix)]
pub fn running_as_root() -> bool {
    // SAFETY: `geteuid` has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}
