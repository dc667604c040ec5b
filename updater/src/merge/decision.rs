//! Per-entry merge decisions and the merge report.

use std::fmt;

/// Outcome of merging one staged top-level entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeDecision {
    /// The destination path was absent; the entry was moved in.
    MoveIn,
    /// The destination path existed and was replaced by the entry.
    Replace,
    /// The destination path is protected and was left untouched.
    SkipProtected,
    /// Removing or replacing the destination path failed.
    SkipLocked {
        /// Description of the filesystem failure.
        reason: String,
    },
}

impl fmt::Display for MergeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveIn => write!(f, "move-in"),
            Self::Replace => write!(f, "replace"),
            Self::SkipProtected => write!(f, "skip (protected)"),
            Self::SkipLocked { reason } => write!(f, "skip (locked: {reason})"),
        }
    }
}

/// A staged entry paired with its decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Top-level entry name.
    pub entry: String,
    /// What happened to it.
    pub decision: MergeDecision,
}

impl MergeOutcome {
    /// Operator-facing status line for this outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use drupdate::merge::decision::{MergeDecision, MergeOutcome};
    ///
    /// let outcome = MergeOutcome {
    ///     entry: "sites".to_owned(),
    ///     decision: MergeDecision::SkipProtected,
    /// };
    /// assert_eq!(outcome.status_line(), "Skipping sites. File already exists.");
    /// ```
    #[must_use]
    pub fn status_line(&self) -> String {
        let entry = &self.entry;
        match &self.decision {
            MergeDecision::MoveIn => format!("Added {entry}"),
            MergeDecision::Replace => format!("Replaced {entry}"),
            MergeDecision::SkipProtected => format!("Skipping {entry}. File already exists."),
            MergeDecision::SkipLocked { .. } => format!("{entry} locked"),
        }
    }
}

/// Ordered log of merge outcomes, in staging order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    outcomes: Vec<MergeOutcome>,
}

impl MergeReport {
    /// Append an outcome.
    pub fn record(&mut self, entry: impl Into<String>, decision: MergeDecision) {
        self.outcomes.push(MergeOutcome {
            entry: entry.into(),
            decision,
        });
    }

    /// All outcomes in processing order.
    #[must_use]
    pub fn outcomes(&self) -> &[MergeOutcome] {
        &self.outcomes
    }

    /// Decision recorded for `entry`, if any.
    #[must_use]
    pub fn decision_for(&self, entry: &str) -> Option<&MergeDecision> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.entry == entry)
            .map(|outcome| &outcome.decision)
    }

    /// One-line tally of the run.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let count = |wanted: fn(&MergeDecision) -> bool| {
            self.outcomes
                .iter()
                .filter(|outcome| wanted(&outcome.decision))
                .count()
        };
        format!(
            "{} added, {} replaced, {} protected, {} locked",
            count(|d| matches!(d, MergeDecision::MoveIn)),
            count(|d| matches!(d, MergeDecision::Replace)),
            count(|d| matches!(d, MergeDecision::SkipProtected)),
            count(|d| matches!(d, MergeDecision::SkipLocked { .. })),
        )
    }
}
