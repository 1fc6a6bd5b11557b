//! Git command wrappers.
//!
//! This module provides a thin wrapper around git CLI commands. Unlike a
//! typical wrapper, a non-zero exit status is not turned into an error here:
//! every invocation yields a [`GitOutput`] the caller inspects, and only a
//! failure to start git at all is reported as `Err`.

use anyhow::Context;
use colored::Colorize;
use std::path::Path;

use crate::constants::STAGE_ALL_PATHSPEC;

/// Callback invoked with the arguments of every git command before it runs.
pub type GitLogger = fn(&[&str]);

/// Echoes the git command line to stderr.
pub fn verbose_logger(args: &[&str]) {
    eprintln!("  {} {}", "$ git".dimmed(), args.join(" ").dimmed());
}

pub fn no_op_logger(_args: &[&str]) {}

/// Exit status and captured streams of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout followed by stderr, trimmed, skipping empty streams.
    #[must_use]
    pub fn combined(&self) -> String {
        [self.stdout.trim(), self.stderr.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<std::process::Output> for GitOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// The command-execution interface the sync pipeline drives.
pub trait CommandRunner {
    /// Runs `git <args>` in `repo`.
    ///
    /// Returns `Err` only when the command could not be executed; a non-zero
    /// exit is reported through [`GitOutput::exit_code`].
    fn run(&self, repo: &Path, args: &[&str]) -> anyhow::Result<GitOutput>;
}

/// Runs the `git` executable found on `PATH`.
#[derive(Debug, Clone, Copy)]
pub struct GitCli {
    logger: GitLogger,
}

impl GitCli {
    pub fn new(logger: GitLogger) -> Self {
        Self { logger }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(no_op_logger)
    }
}

impl CommandRunner for GitCli {
    fn run(&self, repo: &Path, args: &[&str]) -> anyhow::Result<GitOutput> {
        (self.logger)(args);
        exec_git(repo, args)
    }
}

fn exec_git(repo: &Path, args: &[&str]) -> anyhow::Result<GitOutput> {
    let output = std::process::Command::new("git")
        .current_dir(repo)
        .args(args)
        .output()
        .with_context(|| format!("Failed to spawn git command: git {}", args.join(" ")))?;

    Ok(output.into())
}

/// Runs git and fails on a non-zero exit, returning trimmed stdout.
///
/// Used for queries and fixtures where a failure is an error, not data.
pub fn run_git(repo: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = exec_git(repo, args)?;

    if output.success() {
        Ok(output.stdout.trim().to_string())
    } else {
        anyhow::bail!("git {} failed: {}", args.join(" "), output.stderr.trim())
    }
}

/// Rejects names git would misread as options or that cannot be a ref.
pub fn validate_ref_name(kind: &str, name: &str) -> anyhow::Result<()> {
    if name.is_empty()
        || name.starts_with('-')
        || name.contains('\0')
        || name.contains('\n')
        || name.chars().any(char::is_whitespace)
    {
        anyhow::bail!("Invalid {} name: {:?}", kind, name);
    }
    Ok(())
}

pub fn checkout(runner: &dyn CommandRunner, repo: &Path, branch: &str) -> anyhow::Result<GitOutput> {
    validate_ref_name("branch", branch)?;
    runner
        .run(repo, &["checkout", branch])
        .with_context(|| format!("Failed to checkout branch '{}'", branch))
}

pub fn pull(
    runner: &dyn CommandRunner,
    repo: &Path,
    remote: &str,
    branch: &str,
) -> anyhow::Result<GitOutput> {
    validate_ref_name("remote", remote)?;
    validate_ref_name("branch", branch)?;
    runner
        .run(repo, &["pull", remote, branch])
        .with_context(|| format!("Failed to pull {}/{}", remote, branch))
}

pub fn add_all(runner: &dyn CommandRunner, repo: &Path) -> anyhow::Result<GitOutput> {
    runner
        .run(repo, &["add", STAGE_ALL_PATHSPEC])
        .context("Failed to stage changes")
}

pub fn commit(runner: &dyn CommandRunner, repo: &Path, message: &str) -> anyhow::Result<GitOutput> {
    runner
        .run(repo, &["commit", "-m", message])
        .context("Failed to commit")
}

pub fn push(
    runner: &dyn CommandRunner,
    repo: &Path,
    remote: &str,
    branch: &str,
) -> anyhow::Result<GitOutput> {
    validate_ref_name("remote", remote)?;
    validate_ref_name("branch", branch)?;
    runner
        .run(repo, &["push", remote, branch])
        .with_context(|| format!("Failed to push to {}/{}", remote, branch))
}
