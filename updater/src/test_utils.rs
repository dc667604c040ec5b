//! Shared test utilities for the updater crate.

use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use tempfile::TempDir;

/// A temporary directory addressed through a UTF-8 path.
pub struct TempTree {
    _temp: TempDir,
    /// Root of the temporary tree.
    pub root: Utf8PathBuf,
}

impl TempTree {
    /// Create an empty temporary tree.
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 temp path");
        Self { _temp: temp, root }
    }

    /// Return `root/relative`.
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

/// Build a gzip-compressed tarball at `archive` from `(path, contents)`
/// pairs. Paths ending in `/` become directory entries.
pub fn write_tar_gz(archive: &Utf8Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(archive).expect("create archive");
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        if path.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            header.set_cksum();
            builder
                .append_data(&mut header, path, std::io::empty())
                .expect("append directory");
        } else {
            header.set_mode(0o644);
            header.set_size(contents.len() as u64);
            header.set_cksum();
            builder
                .append_data(&mut header, path, *contents)
                .expect("append file");
        }
    }
    let encoder = builder.into_inner().expect("tar finish");
    encoder.finish().expect("gzip finish");
}

/// Build a release package tarball rooted at `root` containing `files`
/// (relative to the package root).
pub fn write_package(archive: &Utf8Path, root: &str, files: &[(&str, &[u8])]) {
    let prefixed: Vec<(String, &[u8])> = files
        .iter()
        .map(|(path, contents)| (format!("{root}/{path}"), *contents))
        .collect();
    let mut entries: Vec<(&str, &[u8])> = Vec::with_capacity(prefixed.len() + 1);
    let root_dir = format!("{root}/");
    entries.push((root_dir.as_str(), b""));
    entries.extend(prefixed.iter().map(|(path, contents)| (path.as_str(), *contents)));
    write_tar_gz(archive, &entries);
}
