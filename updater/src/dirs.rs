//! Directory resolution abstraction for platform-specific paths.
//!
//! Wraps `directories-next` behind a trait so configuration lookup and
//! scratch placement can be tested without touching the real home
//! directory.

use directories_next::ProjectDirs;
use std::path::{Path, PathBuf};

/// Platform directories the updater consults.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// Directory holding `drupdate.toml`.
    fn config_dir(&self) -> Option<PathBuf>;

    /// Per-user cache directory, the fallback scratch location.
    fn cache_dir(&self) -> Option<PathBuf>;

    /// Directory containing the running executable.
    fn executable_dir(&self) -> Option<PathBuf>;
}

/// [`BaseDirs`] backed by `directories-next` and the current executable.
#[derive(Debug, Clone)]
pub struct SystemBaseDirs {
    project: Option<ProjectDirs>,
}

impl SystemBaseDirs {
    /// Resolve the project directories for `drupdate`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            project: ProjectDirs::from("org", "Drupal", "drupdate"),
        }
    }
}

impl Default for SystemBaseDirs {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseDirs for SystemBaseDirs {
    fn config_dir(&self) -> Option<PathBuf> {
        self.project
            .as_ref()
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn cache_dir(&self) -> Option<PathBuf> {
        self.project
            .as_ref()
            .map(|dirs| dirs.cache_dir().to_path_buf())
    }

    fn executable_dir(&self) -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
    }
}
