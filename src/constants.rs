//! Application-wide constants.
//!
//! Centralized configuration values to avoid magic strings throughout the codebase.

/// Branch that is checked out, pulled and pushed.
pub const MAIN_BRANCH: &str = "main";

/// Remote that is pulled from and pushed to.
pub const DEFAULT_REMOTE: &str = "origin";

/// Pathspec handed to `git add` to stage the whole working tree.
pub const STAGE_ALL_PATHSPEC: &str = ".";

/// Fixed prefix of every generated commit message.
pub const COMMIT_MESSAGE_PREFIX: &str = "Auto commit on";

/// Progress spinner tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;

/// Default name used when a repository name cannot be determined from its path.
pub const DEFAULT_REPO_NAME: &str = "repository";
