//! Interactive operator prompts.
//!
//! The updater asks two questions: where to install when no destination was
//! given, and whether to proceed with a release flagged as insecure.

use crate::error::{Result, UpdaterError};
use camino::Utf8PathBuf;
use std::io::{BufRead, Write};

/// Question shown before reading a destination directory.
pub const DESTINATION_PROMPT: &str = "Enter installation location: ";

/// Source of operator answers.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Ask whether the insecure release `version` may be installed.
    ///
    /// Only an exact `Y` answer counts as consent.
    fn confirm_insecure(&mut self, version: &str) -> bool;

    /// Ask for the installation directory.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::NoDestination`] for an empty answer or end of
    /// input, and [`UpdaterError::Io`] when the input cannot be read.
    fn destination(&mut self) -> Result<Utf8PathBuf>;
}

/// How releases classified `Insecure` are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsecurePolicy {
    /// Install without asking.
    Allow,
    /// Refuse without asking.
    Deny,
    /// Ask the operator.
    #[default]
    Confirm,
}

impl InsecurePolicy {
    /// Decide whether `version` may proceed, consulting `prompter` only
    /// under [`InsecurePolicy::Confirm`].
    #[must_use]
    pub fn permits(self, version: &str, prompter: &mut dyn Prompter) -> bool {
        match self {
            Self::Allow => true,
            Self::Deny => false,
            Self::Confirm => prompter.confirm_insecure(version),
        }
    }
}

/// [`Prompter`] reading answers from a buffered reader.
pub struct StdioPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StdioPrompter<R, W> {
    /// Prompt on `output` and read answers from `input`.
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> std::io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Ok(None);
        }
        Ok(Some(answer.trim().to_owned()))
    }
}

impl<R: BufRead, W: Write> Prompter for StdioPrompter<R, W> {
    fn confirm_insecure(&mut self, version: &str) -> bool {
        let question = format!("Version {version} is insecure. Proceed anyway? [Y/n] ");
        matches!(self.ask(&question), Ok(Some(answer)) if answer == "Y")
    }

    fn destination(&mut self) -> Result<Utf8PathBuf> {
        match self.ask(DESTINATION_PROMPT)? {
            Some(answer) if !answer.is_empty() => Ok(Utf8PathBuf::from(answer)),
            _ => Err(UpdaterError::NoDestination),
        }
    }
}
