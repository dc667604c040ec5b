//! CLI argument definitions for drupdate.
//!
//! This module defines the command-line interface using clap. The binary
//! only translates these arguments into pipeline calls.

use crate::prompt::InsecurePolicy;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};

/// Download, verify and install Drupal 7 core releases.
#[derive(Parser, Debug)]
#[command(name = "drupdate")]
#[command(version, about)]
#[command(long_about = concat!(
    "Download, verify and install Drupal 7 core releases.\n\n",
    "Releases are looked up in the drupal.org release history feed, fetched ",
    "into a scratch directory, checked against the published MD5 digest and ",
    "merged into an existing installation. The `sites` directory and ",
    "`.htaccess` are left untouched unless --replace is given.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Show the five newest releases:\n",
    "    $ drupdate list 5\n\n",
    "  Update /var/www/html to the newest release:\n",
    "    $ drupdate download -i /var/www/html\n\n",
    "  Install a specific release, replacing sites/ and .htaccess too:\n",
    "    $ drupdate download 7.98 -i /var/www/html --replace\n\n",
    "  Install from an archive already on disk:\n",
    "    $ drupdate install -f drupal-7.98.tar.gz -i /var/www/html",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file [default: drupdate.toml in the platform config dir].
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List available releases, newest first.
    List(ListArgs),

    /// Download a release and install it.
    Download(DownloadArgs),

    /// Install a release archive already on disk.
    Install(InstallArgs),
}

/// Arguments for the list command.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Show only the N most recent releases.
    #[arg(value_name = "N")]
    pub limit: Option<usize>,
}

/// Destination and merge flags shared by `download` and `install`.
#[derive(Args, Debug, Clone, Default)]
pub struct MergeArgs {
    /// Drupal installation to update [prompted when omitted].
    #[arg(short = 'i', long = "install", value_name = "DIR")]
    pub destination: Option<Utf8PathBuf>,

    /// Also replace `sites` and `.htaccess`.
    #[arg(long)]
    pub replace: bool,

    /// Keep the extracted package in the scratch directory.
    #[arg(long)]
    pub keep_extract: bool,
}

/// Arguments for the download command.
#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Release to install [default: newest].
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    /// Install releases flagged insecure without asking.
    #[arg(long)]
    pub allow_insecure: bool,

    /// Destination and merge flags.
    #[command(flatten)]
    pub merge: MergeArgs,
}

/// Arguments for the install command.
#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Path to a `.tar.gz` release archive.
    #[arg(short = 'f', long = "file", value_name = "ARCHIVE")]
    pub archive: Utf8PathBuf,

    /// Destination and merge flags.
    #[command(flatten)]
    pub merge: MergeArgs,
}

impl DownloadArgs {
    /// Policy for releases flagged insecure.
    ///
    /// # Examples
    ///
    /// ```
    /// use drupdate::cli::DownloadArgs;
    /// use drupdate::prompt::InsecurePolicy;
    ///
    /// let args = DownloadArgs { allow_insecure: true, ..DownloadArgs::default() };
    /// assert_eq!(args.insecure_policy(), InsecurePolicy::Allow);
    /// ```
    #[must_use]
    pub fn insecure_policy(&self) -> InsecurePolicy {
        if self.allow_insecure {
            InsecurePolicy::Allow
        } else {
            InsecurePolicy::Confirm
        }
    }
}

impl Cli {
    /// Explicit configuration file, if one was given.
    #[must_use]
    pub fn config_path(&self) -> Option<&Utf8Path> {
        self.config.as_deref()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
