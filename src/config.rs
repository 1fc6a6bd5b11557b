//! Configuration types for CLI verbosity and options.

use crate::git::{self, GitLogger};
use crate::sync::FailurePolicy;

/// Runtime configuration derived from CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Controls the verbosity level of CLI output.
    pub verbosity: Verbosity,
    pub failure_policy: FailurePolicy,
    /// Wait for a key press before exiting.
    pub pause: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            failure_policy: FailurePolicy::default(),
            pause: true,
        }
    }
}

impl Config {
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Returns the appropriate git logger based on verbosity settings.
    ///
    /// Config only picks the callback; the logging itself lives in the git module.
    #[must_use]
    pub fn git_logger(&self) -> GitLogger {
        if self.is_verbose() {
            git::verbose_logger
        } else {
            git::no_op_logger
        }
    }
}

/// Verbosity level for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}
