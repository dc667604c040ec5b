//! Integrity verification of downloaded release archives.
//!
//! The catalog's MD5 digest guards against accidental corruption, not
//! tampering. A mismatch is recoverable: the archive is deleted so the next
//! run fetches it afresh, and the caller decides whether to abort.

use super::md5_digest::Md5Digest;
use camino::Utf8Path;
use log::warn;
use md5::{Digest, Md5};
use std::fs;
use std::io::{self, Read};

/// Result of comparing an archive against its expected digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The computed digest matches the expected one.
    Verified,
    /// The digests disagree; the archive has been deleted.
    Mismatch {
        /// Digest published by the catalog.
        expected: Md5Digest,
        /// Digest of the local bytes.
        actual: Md5Digest,
    },
}

impl VerificationOutcome {
    /// Return true when the archive may be used.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Compute the MD5 digest of a byte slice.
///
/// # Examples
///
/// ```
/// use drupdate::release::verification::digest_bytes;
///
/// assert_eq!(digest_bytes(b"").as_str(), "d41d8cd98f00b204e9800998ecf8427e");
/// ```
#[must_use]
pub fn digest_bytes(bytes: &[u8]) -> Md5Digest {
    hex_digest(Md5::digest(bytes).as_slice())
}

/// Compute the MD5 digest of the complete file at `path`.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn compute_md5(path: &Utf8Path) -> io::Result<Md5Digest> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Md5::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(hex_digest(hasher.finalize().as_slice()))
}

/// Verify the archive at `path` against `expected`.
///
/// On mismatch the archive is removed before returning
/// [`VerificationOutcome::Mismatch`].
///
/// # Errors
///
/// Returns an I/O error if the archive cannot be read or, after a
/// mismatch, cannot be removed.
pub fn verify_archive(path: &Utf8Path, expected: &Md5Digest) -> io::Result<VerificationOutcome> {
    let actual = compute_md5(path)?;
    if &actual == expected {
        return Ok(VerificationOutcome::Verified);
    }

    warn!("digest mismatch for {path}: expected {expected}, computed {actual}");
    fs::remove_file(path)?;
    Ok(VerificationOutcome::Mismatch {
        expected: expected.clone(),
        actual,
    })
}

fn hex_digest(bytes: &[u8]) -> Md5Digest {
    Md5Digest::from_computed(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
}
