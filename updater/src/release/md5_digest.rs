//! MD5 digest newtype for release integrity checks.
//!
//! The release catalog publishes a 128-bit MD5 digest for every package.
//! Values are normalised to lowercase on construction so that comparisons
//! are case-insensitive throughout the crate.

use std::fmt;
use thiserror::Error;

/// Expected length of a hex-encoded MD5 digest.
const DIGEST_HEX_LEN: usize = 32;

/// Errors arising from malformed digest strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// The value is not a 32-character hex string.
    #[error("invalid MD5 digest \"{value}\": {reason}")]
    Invalid {
        /// The rejected digest string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },
}

/// A validated, lowercase hex-encoded MD5 digest.
///
/// # Examples
///
/// ```
/// use drupdate::release::md5_digest::Md5Digest;
///
/// let digest = Md5Digest::try_from("5EB63BBBE01EEED093CB22BB8F5ACDC3").unwrap();
/// assert_eq!(digest.as_str(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Md5Digest(String);

impl Md5Digest {
    /// Return the digest as a lowercase hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap the hex rendering of a freshly computed 16-byte digest.
    pub(crate) fn from_computed(hex: String) -> Self {
        debug_assert_eq!(hex.len(), DIGEST_HEX_LEN);
        Self(hex)
    }
}

impl TryFrom<&str> for Md5Digest {
    type Error = DigestError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        validate_md5(trimmed)?;
        Ok(Self(trimmed.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Md5Digest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for Md5Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_md5(value: &str) -> Result<(), DigestError> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(DigestError::Invalid {
            value: value.to_owned(),
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(DigestError::Invalid {
            value: value.to_owned(),
            reason: format!("non-hex character '{bad}'"),
        });
    }
    Ok(())
}
