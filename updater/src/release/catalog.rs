//! Release catalog client.
//!
//! The upstream release-history endpoint returns an XML document with
//! repeated `releases/release` elements. Each release carries `name`,
//! `version`, `download_link`, `mdhash`, and optional `terms/term` entries
//! whose `value` may be `Insecure`.

use super::download::{DownloadError, HttpTransport};
use super::md5_digest::{DigestError, Md5Digest};
use super::record::{ReleaseCatalog, ReleaseRecord, Security};
use roxmltree::{Document, Node};

/// Term value marking a release as known-vulnerable.
const INSECURE_TERM: &str = "Insecure";

/// Errors arising while retrieving or parsing the release catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog document could not be fetched.
    #[error(transparent)]
    Fetch(#[from] DownloadError),

    /// The catalog is not well-formed XML.
    #[error("malformed catalog XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A release element lacks a required child element.
    #[error("release #{index} is missing <{field}>")]
    MissingField {
        /// Zero-based position of the release in the document.
        index: usize,
        /// Name of the missing element.
        field: &'static str,
    },

    /// A release publishes an unusable digest.
    #[error("release {version} has an invalid digest: {source}")]
    InvalidDigest {
        /// Version identifier of the offending release.
        version: String,
        /// The digest validation failure.
        #[source]
        source: DigestError,
    },
}

/// Source of release catalogs.
#[cfg_attr(test, mockall::automock)]
pub trait CatalogClient {
    /// List published releases, newest first, limited to the `limit` most
    /// recent versions when given.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] when the catalog cannot be fetched or
    /// parsed.
    fn list_versions(&self, limit: Option<usize>) -> Result<ReleaseCatalog, CatalogError>;
}

/// Catalog client that reads the release-history XML over HTTP.
pub struct HttpCatalogClient<'a> {
    transport: &'a dyn HttpTransport,
    url: String,
}

impl<'a> HttpCatalogClient<'a> {
    /// Create a client for the release-history document at `url`.
    #[must_use]
    pub fn new(transport: &'a dyn HttpTransport, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }
}

impl CatalogClient for HttpCatalogClient<'_> {
    fn list_versions(&self, limit: Option<usize>) -> Result<ReleaseCatalog, CatalogError> {
        let body = self.transport.get_text(&self.url)?;
        Ok(parse_catalog(&body)?.limited(limit))
    }
}

/// Parse a release-history document into a [`ReleaseCatalog`].
///
/// # Errors
///
/// Returns a [`CatalogError`] when the XML is malformed, a release lacks a
/// required field, or a digest is invalid.
///
/// # Examples
///
/// ```
/// use drupdate::release::catalog::parse_catalog;
///
/// let xml = r#"<project><releases><release>
///   <name>drupal 7.98</name>
///   <version>7.98</version>
///   <download_link>https://ftp.drupal.org/files/projects/drupal-7.98.tar.gz</download_link>
///   <mdhash>d41d8cd98f00b204e9800998ecf8427e</mdhash>
/// </release></releases></project>"#;
/// let catalog = parse_catalog(xml).unwrap();
/// assert_eq!(catalog.versions(), ["7.98"]);
/// ```
pub fn parse_catalog(xml: &str) -> Result<ReleaseCatalog, CatalogError> {
    let document = Document::parse(xml)?;
    let records = document
        .root_element()
        .children()
        .filter(|node| node.has_tag_name("releases"))
        .flat_map(|releases| releases.children().filter(|node| node.has_tag_name("release")))
        .enumerate()
        .map(|(index, release)| parse_release(index, release))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ReleaseCatalog::from_records(records))
}

fn parse_release(index: usize, release: Node<'_, '_>) -> Result<ReleaseRecord, CatalogError> {
    let field = |name: &'static str| {
        child_text(release, name).ok_or(CatalogError::MissingField { index, field: name })
    };

    let version = field("version")?;
    let digest = Md5Digest::try_from(field("mdhash")?).map_err(|source| {
        CatalogError::InvalidDigest {
            version: version.clone(),
            source,
        }
    })?;

    Ok(ReleaseRecord {
        name: field("name")?,
        url: field("download_link")?,
        digest,
        security: security_of(release),
        version,
    })
}

fn security_of(release: Node<'_, '_>) -> Security {
    let insecure = release
        .children()
        .filter(|node| node.has_tag_name("terms"))
        .flat_map(|terms| terms.children().filter(|node| node.has_tag_name("term")))
        .filter_map(|term| child_text(term, "value"))
        .any(|value| value == INSECURE_TERM);
    if insecure {
        Security::Insecure
    } else {
        Security::Normal
    }
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(name))
        .and_then(|child| child.text())
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
