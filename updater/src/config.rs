//! Updater configuration.
//!
//! Settings come from an optional `drupdate.toml`; every field has a
//! default so an absent file is equivalent to an empty one. CLI flags are
//! layered on top by the binary.

use crate::dirs::BaseDirs;
use crate::error::{Result, UpdaterError};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Release history feed for Drupal 7 core.
pub const DEFAULT_CATALOG_URL: &str = "https://updates.drupal.org/release-history/drupal/7.x";

/// File name looked up in the platform configuration directory.
pub const CONFIG_FILE_NAME: &str = "drupdate.toml";

/// Scratch directory name created beside the executable.
pub const SCRATCH_DIR_NAME: &str = ".tempdir";

/// Default network timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings shared by every command.
///
/// # Examples
///
/// ```
/// use drupdate::config::{DEFAULT_CATALOG_URL, UpdaterConfig};
///
/// let config = UpdaterConfig::from_toml_str("keep_extract = true").expect("valid");
/// assert!(config.keep_extract);
/// assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdaterConfig {
    /// URL of the release history XML.
    pub catalog_url: String,
    /// Scratch workspace location; resolved lazily when unset.
    pub scratch_dir: Option<Utf8PathBuf>,
    /// Timeout applied to every HTTP request.
    pub download_timeout_secs: u64,
    /// Leave the extracted package in the scratch workspace after merging.
    pub keep_extract: bool,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_owned(),
            scratch_dir: None,
            download_timeout_secs: DEFAULT_TIMEOUT_SECS,
            keep_extract: false,
        }
    }
}

impl UpdaterConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input or unknown keys.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `drupdate.toml` in the
    /// platform config directory is used when present, else defaults.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Config`] when the file cannot be read or
    /// parsed.
    pub fn load(explicit: Option<&Utf8Path>, dirs: &dyn BaseDirs) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        let Some(path) = dirs
            .config_dir()
            .and_then(utf8_dir)
            .map(|dir| dir.join(CONFIG_FILE_NAME))
        else {
            debug!("no configuration directory; using defaults");
            return Ok(Self::default());
        };

        if path.is_file() {
            Self::read(&path)
        } else {
            debug!("{path} not found; using defaults");
            Ok(Self::default())
        }
    }

    fn read(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| UpdaterError::Config {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;
        let config = Self::from_toml_str(&text).map_err(|err| UpdaterError::Config {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;
        debug!("loaded configuration from {path}");
        Ok(config)
    }

    /// Timeout applied to HTTP requests.
    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Resolve the scratch workspace root.
    ///
    /// Order: the configured path, `.tempdir` beside the executable, then
    /// `.tempdir` inside the platform cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Config`] when none of these is available.
    pub fn resolve_scratch_dir(&self, dirs: &dyn BaseDirs) -> Result<Utf8PathBuf> {
        if let Some(dir) = &self.scratch_dir {
            return Ok(dir.clone());
        }
        dirs.executable_dir()
            .and_then(utf8_dir)
            .or_else(|| dirs.cache_dir().and_then(utf8_dir))
            .map(|dir| dir.join(SCRATCH_DIR_NAME))
            .ok_or_else(|| UpdaterError::Config {
                path: Utf8PathBuf::from(SCRATCH_DIR_NAME),
                reason: "could not determine a scratch directory".to_owned(),
            })
    }
}

fn utf8_dir(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path)
        .map_err(|path| debug!("ignoring non-UTF-8 directory {}", path.display()))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirs::MockBaseDirs;
    use crate::test_utils::{TempTree, write_file};
    use rstest::rstest;

    fn dirs_with_config(dir: Option<Utf8PathBuf>) -> MockBaseDirs {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_config_dir()
            .returning(move || dir.clone().map(Utf8PathBuf::into_std_path_buf));
        dirs
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = UpdaterConfig::from_toml_str("").expect("empty TOML");
        assert_eq!(config, UpdaterConfig::default());
        assert_eq!(config.download_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn file_values_override_defaults() {
        let config = UpdaterConfig::from_toml_str(concat!(
            "catalog_url = \"http://mirror.local/7.x\"\n",
            "scratch_dir = \"/var/tmp/drupdate\"\n",
            "download_timeout_secs = 5\n",
        ))
        .expect("valid TOML");

        assert_eq!(config.catalog_url, "http://mirror.local/7.x");
        assert_eq!(config.scratch_dir.as_deref(), Some(Utf8Path::new("/var/tmp/drupdate")));
        assert_eq!(config.download_timeout_secs, 5);
        assert!(!config.keep_extract);
    }

    #[rstest]
    #[case::unknown_key("mirror = \"x\"")]
    #[case::wrong_type("download_timeout_secs = \"slow\"")]
    #[case::not_toml("catalog_url =")]
    fn malformed_files_are_rejected(#[case] text: &str) {
        assert!(UpdaterConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let tree = TempTree::new();
        let dirs = dirs_with_config(Some(tree.root.clone()));

        let config = UpdaterConfig::load(None, &dirs).expect("defaults");
        assert_eq!(config, UpdaterConfig::default());
    }

    #[test]
    fn default_file_is_read_from_config_dir() {
        let tree = TempTree::new();
        write_file(&tree.path(CONFIG_FILE_NAME), b"keep_extract = true\n");
        let dirs = dirs_with_config(Some(tree.root.clone()));

        let config = UpdaterConfig::load(None, &dirs).expect("load");
        assert!(config.keep_extract);
    }

    #[test]
    fn malformed_default_file_is_a_config_error() {
        let tree = TempTree::new();
        write_file(&tree.path(CONFIG_FILE_NAME), b"keep_extract = maybe\n");
        let dirs = dirs_with_config(Some(tree.root.clone()));

        let err = UpdaterConfig::load(None, &dirs).expect_err("malformed");
        assert!(matches!(err, UpdaterError::Config { ref path, .. } if path.ends_with(CONFIG_FILE_NAME)));
    }

    #[test]
    fn explicit_missing_file_is_a_config_error() {
        let tree = TempTree::new();
        let dirs = MockBaseDirs::new();

        let err = UpdaterConfig::load(Some(&tree.path("absent.toml")), &dirs)
            .expect_err("explicit path must exist");
        assert!(matches!(err, UpdaterError::Config { .. }));
    }

    #[test]
    fn configured_scratch_dir_wins() {
        let config = UpdaterConfig {
            scratch_dir: Some(Utf8PathBuf::from("/srv/scratch")),
            ..UpdaterConfig::default()
        };
        let dirs = MockBaseDirs::new();

        let dir = config.resolve_scratch_dir(&dirs).expect("resolve");
        assert_eq!(dir, Utf8PathBuf::from("/srv/scratch"));
    }

    #[rstest]
    #[case::beside_executable(Some("/opt/drupdate/bin"), Some("/home/u/.cache/drupdate"), "/opt/drupdate/bin/.tempdir")]
    #[case::cache_fallback(None, Some("/home/u/.cache/drupdate"), "/home/u/.cache/drupdate/.tempdir")]
    fn scratch_dir_fallbacks(
        #[case] exe: Option<&'static str>,
        #[case] cache: Option<&'static str>,
        #[case] expected: &str,
    ) {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_executable_dir()
            .returning(move || exe.map(PathBuf::from));
        dirs.expect_cache_dir()
            .returning(move || cache.map(PathBuf::from));

        let dir = UpdaterConfig::default()
            .resolve_scratch_dir(&dirs)
            .expect("resolve");
        assert_eq!(dir, Utf8PathBuf::from(expected));
    }

    #[test]
    fn no_scratch_location_is_a_config_error() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_executable_dir().returning(|| None);
        dirs.expect_cache_dir().returning(|| None);

        let err = UpdaterConfig::default()
            .resolve_scratch_dir(&dirs)
            .expect_err("nowhere to stage");
        assert!(matches!(err, UpdaterError::Config { .. }));
    }
}
