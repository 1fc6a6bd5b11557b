use anyhow::Context;
use auto_sync::config::{Config, Verbosity};
use auto_sync::constants::{DEFAULT_REMOTE, MAIN_BRANCH};
use auto_sync::git::GitCli;
use auto_sync::output::{self, ConsoleCallbacks};
use auto_sync::sync::{FailurePolicy, SyncRunner};
use clap::Parser;
use std::path::PathBuf;

/// Checkout, pull, stage everything, commit with a timestamp, and push.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository directory (defaults to the current directory)
    #[arg(short = 'C', long)]
    path: Option<PathBuf>,

    /// Branch to check out, pull and push
    #[arg(short, long, default_value = MAIN_BRANCH)]
    branch: String,

    /// Remote to pull from and push to
    #[arg(short, long, default_value = DEFAULT_REMOTE)]
    remote: String,

    /// Only print failures and the summary count
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print every git command and its full output
    #[arg(short, long)]
    verbose: bool,

    /// Stop at the first failed git command
    #[arg(long)]
    halt_on_error: bool,

    /// Exit without waiting for a key press
    #[arg(long)]
    no_pause: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let verbosity = if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        let failure_policy = if self.halt_on_error {
            FailurePolicy::Halt
        } else {
            FailurePolicy::Continue
        };
        Config {
            verbosity,
            failure_policy,
            pause: !self.no_pause,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    let path = match &cli.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    output::print_working_dir(&path, &config);

    let git = GitCli::new(config.git_logger());
    let runner = SyncRunner::new(&path, &git)
        .with_remote(&cli.remote)?
        .with_branch(&cli.branch)?
        .with_policy(config.failure_policy);

    let report = runner.run(&ConsoleCallbacks::new(config));

    output::print_summary(&report, &config);
    output::print_done();
    output::pause(&config)?;

    if report.halted_at.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_matches_default_config() {
        let cli = Cli::parse_from(["auto-sync"]);
        assert_eq!(cli.config(), Config::default());
        assert_eq!(cli.branch, "main");
        assert_eq!(cli.remote, "origin");
        assert!(cli.path.is_none());
    }

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::parse_from(["auto-sync", "-q", "--halt-on-error", "--no-pause"]);
        let config = cli.config();
        assert_eq!(config.verbosity, Verbosity::Quiet);
        assert_eq!(config.failure_policy, FailurePolicy::Halt);
        assert!(!config.pause);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["auto-sync", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
