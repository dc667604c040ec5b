//! Destination names that are never overwritten without `--replace`.

/// Base names holding operator data: the multisite folder and the web
/// server access rules.
pub const PROTECTED_NAMES: [&str; 2] = ["sites", ".htaccess"];

/// Fixed set of protected top-level names, matched by base name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtectionSet;

impl ProtectionSet {
    /// Return true when `entry` must not be silently replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use drupdate::merge::protection::ProtectionSet;
    ///
    /// assert!(ProtectionSet.contains("sites"));
    /// assert!(!ProtectionSet.contains("modules"));
    /// ```
    #[must_use]
    pub fn contains(self, entry: &str) -> bool {
        PROTECTED_NAMES.contains(&entry)
    }
}
