//! Human-readable output for the updater CLI.
//!
//! Status lines go to an injected writer (stderr in the binary); the version
//! listing goes to stdout because it is the command's actual result.

use crate::error::{Result, UpdaterError};
use crate::release::record::ReleaseCatalog;
use std::fmt::Display;
use std::io::Write;

/// Final status line of a completed install.
pub const DONE: &str = "Done";

/// Write one status line, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Heading printed above the version listing.
///
/// # Examples
///
/// ```
/// use drupdate::output::listing_heading;
///
/// assert_eq!(listing_heading(Some(5), 80), "Showing most recent 5 versions");
/// assert_eq!(listing_heading(None, 80), "80 available versions");
/// ```
#[must_use]
pub fn listing_heading(limit: Option<usize>, available: usize) -> String {
    match limit {
        Some(count) => format!("Showing most recent {count} versions"),
        None => format!("{available} available versions"),
    }
}

/// Format the catalog as a heading followed by one version per line.
#[must_use]
pub fn format_listing(catalog: &ReleaseCatalog, limit: Option<usize>) -> String {
    let mut output = listing_heading(limit, catalog.len());
    for version in catalog.versions() {
        output.push('\n');
        output.push_str(version);
    }
    output
}

/// Write the version listing to `stdout`.
///
/// # Errors
///
/// Returns [`UpdaterError::WriteFailed`] when `stdout` rejects the write.
pub fn write_listing(
    stdout: &mut dyn Write,
    catalog: &ReleaseCatalog,
    limit: Option<usize>,
) -> Result<()> {
    writeln!(stdout, "{}", format_listing(catalog, limit))
        .map_err(|source| UpdaterError::WriteFailed { source })
}
