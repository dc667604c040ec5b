//! Release records and the ordered release catalog.

use super::md5_digest::Md5Digest;
use log::debug;
use std::collections::HashMap;
use std::fmt;

/// Security classification published alongside a release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Security {
    /// No classification term marks the release.
    #[default]
    Normal,
    /// The catalog flags the release as known to be vulnerable.
    Insecure,
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Insecure => write!(f, "Insecure"),
        }
    }
}

/// Metadata describing one published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    /// Version identifier, unique within a catalog (for example `7.98`).
    pub version: String,
    /// Human-readable release name (for example `drupal 7.98`).
    pub name: String,
    /// Download URL of the release archive.
    pub url: String,
    /// Expected digest of the archive.
    pub digest: Md5Digest,
    /// Security classification.
    pub security: Security,
}

impl ReleaseRecord {
    /// Return the archive filename, derived from the last URL segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use drupdate::release::md5_digest::Md5Digest;
    /// use drupdate::release::record::{ReleaseRecord, Security};
    ///
    /// let record = ReleaseRecord {
    ///     version: "7.98".to_owned(),
    ///     name: "drupal 7.98".to_owned(),
    ///     url: "https://ftp.drupal.org/files/projects/drupal-7.98.tar.gz".to_owned(),
    ///     digest: Md5Digest::try_from("d41d8cd98f00b204e9800998ecf8427e").unwrap(),
    ///     security: Security::Normal,
    /// };
    /// assert_eq!(record.filename(), "drupal-7.98.tar.gz");
    /// ```
    #[must_use]
    pub fn filename(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }

    /// Return true when the catalog flags this release as insecure.
    #[must_use]
    pub fn is_insecure(&self) -> bool {
        self.security == Security::Insecure
    }
}

/// Ordered collection of releases, newest first.
///
/// Every identifier in the order has a record, and the order holds no
/// duplicates. A limited catalog truncates the order but keeps every record
/// resolvable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseCatalog {
    order: Vec<String>,
    records: HashMap<String, ReleaseRecord>,
}

impl ReleaseCatalog {
    /// Build a catalog from records in published order.
    ///
    /// A version that appears more than once keeps its first (newest) record.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = ReleaseRecord>) -> Self {
        let mut catalog = Self::default();
        for record in records {
            if catalog.records.contains_key(&record.version) {
                debug!("ignoring duplicate catalog entry for {}", record.version);
                continue;
            }
            catalog.order.push(record.version.clone());
            catalog.records.insert(record.version.clone(), record);
        }
        catalog
    }

    /// Restrict the order to the `limit` most recent versions.
    ///
    /// A limit at or beyond the catalog length leaves the order untouched.
    #[must_use]
    pub fn limited(mut self, limit: Option<usize>) -> Self {
        if let Some(limit) = limit {
            self.order.truncate(limit);
        }
        self
    }

    /// Version identifiers in release order, newest first.
    #[must_use]
    pub fn versions(&self) -> &[String] {
        &self.order
    }

    /// Look up the record for `version`.
    #[must_use]
    pub fn get(&self, version: &str) -> Option<&ReleaseRecord> {
        self.records.get(version)
    }

    /// Return the newest release.
    #[must_use]
    pub fn latest(&self) -> Option<&ReleaseRecord> {
        self.order.first().and_then(|version| self.records.get(version))
    }

    /// Number of versions in the order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Return true when the order is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
