//! HTTP transport and the idempotent release fetcher.
//!
//! [`HttpTransport`] is the network seam: the production implementation uses
//! `ureq`, tests substitute a mock. [`Fetcher`] layers the "skip when already
//! present" rule on top so repeated runs reuse a previously downloaded
//! archive.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::time::Duration;

/// Suffix for in-flight downloads; the final name only appears once the
/// body has been fully written.
const PARTIAL_SUFFIX: &str = ".part";

/// Trait for retrieving remote resources.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport {
    /// Fetch `url` and return the body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not text.
    fn get_text(&self, url: &str) -> Result<String, DownloadError>;

    /// Fetch `url` and write the body to `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or the file write fails.
    fn download_to(&self, url: &str, dest: &Utf8Path) -> Result<(), DownloadError>;
}

/// Errors arising from download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested resource was not found (HTTP 404).
    #[error("resource not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP transport backed by a `ureq` agent with a global request timeout.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl HttpTransport for UreqTransport {
    fn get_text(&self, url: &str) -> Result<String, DownloadError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|e| DownloadError::HttpError {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    fn download_to(&self, url: &str, dest: &Utf8Path) -> Result<(), DownloadError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file)?;
        Ok(())
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// What a [`Fetcher::fetch`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file was retrieved from the network.
    Downloaded,
    /// The file already existed locally; no request was made.
    UsedLocal,
}

/// Retrieves release archives, skipping the network when the destination
/// file already exists.
///
/// Existing bytes are not re-validated here; the integrity verifier runs
/// afterwards.
pub struct Fetcher<'a> {
    transport: &'a dyn HttpTransport,
}

impl<'a> Fetcher<'a> {
    /// Create a fetcher over `transport`.
    #[must_use]
    pub fn new(transport: &'a dyn HttpTransport) -> Self {
        Self { transport }
    }

    /// Ensure the body of `url` is present at `dest`.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] when the request or the write fails. A
    /// failed download leaves no file at `dest`.
    pub fn fetch(&self, url: &str, dest: &Utf8Path) -> Result<FetchOutcome, DownloadError> {
        if dest.exists() {
            debug!("{dest} already present, skipping download of {url}");
            return Ok(FetchOutcome::UsedLocal);
        }

        let partial = partial_path(dest);
        if let Err(err) = self.transport.download_to(url, &partial) {
            discard_partial(&partial);
            return Err(err);
        }
        std::fs::rename(&partial, dest)?;
        Ok(FetchOutcome::Downloaded)
    }
}

fn partial_path(dest: &Utf8Path) -> Utf8PathBuf {
    let mut name = dest.file_name().unwrap_or("download").to_owned();
    name.push_str(PARTIAL_SUFFIX);
    dest.with_file_name(name)
}

fn discard_partial(partial: &Utf8Path) {
    if !partial.exists() {
        return;
    }
    if let Err(err) = std::fs::remove_file(partial) {
        debug!("could not remove partial download {partial}: {err}");
    }
}
