//! Spinner, colored step lines, summary and the closing prompt.
//!
//! Git's own output is captured by the pipeline and replayed here, indented
//! under the step that produced it.

use crate::config::Config;
use crate::constants::{DEFAULT_REPO_NAME, PROGRESS_TICK_MS};
use crate::sync::{StepOutcome, StepResult, SyncCallbacks, SyncReport, SyncStep};
use anyhow::Context;
use colored::Colorize;
use dialoguer::console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Spinner shown while a git command runs.
/// Uses `Option` to avoid allocation when progress is hidden (quiet/verbose modes).
pub struct SyncProgress {
    spinner: Option<ProgressBar>,
}

impl SyncProgress {
    pub fn update(&self, step: &SyncStep) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format_step_message(step));
        }
    }

    /// Prints above the spinner without tearing it.
    fn println(&self, line: &str) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    pub fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }
}

/// Creates the step spinner.
/// Returns a hidden tracker in quiet or verbose mode.
#[must_use]
pub fn create_sync_progress(config: &Config) -> SyncProgress {
    let spinner = if config.is_quiet() || config.is_verbose() {
        None
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        Some(spinner)
    };

    SyncProgress { spinner }
}

/// Console callbacks: spinner updates plus a status line per git command.
pub struct ConsoleCallbacks {
    progress: SyncProgress,
    config: Config,
}

impl ConsoleCallbacks {
    pub fn new(config: Config) -> Self {
        Self {
            progress: create_sync_progress(&config),
            config,
        }
    }
}

impl SyncCallbacks for ConsoleCallbacks {
    fn on_sync_start(&self, path: &Path) {
        if self.config.is_verbose() {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_REPO_NAME);
            eprintln!("\n{}", format!("[{}]", name).white().bold());
        }
    }

    fn on_step(&self, step: &SyncStep) {
        self.progress.update(step);
    }

    fn on_step_finished(&self, result: &StepResult) {
        if self.config.is_quiet() && result.is_success() {
            return;
        }
        for line in format_step_result(result) {
            self.progress.println(&line);
        }
    }

    fn on_complete(&self, _report: &SyncReport) {
        self.progress.finish();
    }
}

/// Status line for a finished command followed by its indented git output.
fn format_step_result(result: &StepResult) -> Vec<String> {
    let status = match &result.outcome {
        StepOutcome::Succeeded(_) => format!("{} {}", "✓".green(), result.step),
        StepOutcome::Failed(output) => {
            let code = output
                .exit_code
                .map_or_else(|| "killed".to_string(), |c| format!("exit {}", c));
            format!("{} {} {}", "✗".red(), result.step, format!("({})", code).red())
        }
        StepOutcome::SpawnFailed(_) => format!("{} {} {}", "✗".red(), result.step, "(not run)".red()),
    };

    let mut lines = vec![status];
    lines.extend(
        result
            .output_text()
            .lines()
            .map(|line| format!("    {}", line.dimmed())),
    );
    lines
}

fn format_step_message(step: &SyncStep) -> String {
    match step {
        SyncStep::CheckingOut { branch } => format!("Checking out {}...", branch),
        SyncStep::Pulling { remote, branch } => format!("Pulling from {}/{}...", remote, branch),
        SyncStep::Staging => "Staging all changes...".to_string(),
        SyncStep::ComposingMessage => "Composing commit message...".to_string(),
        SyncStep::Committing => "Committing...".to_string(),
        SyncStep::Pushing { remote, branch } => format!("Pushing to {}/{}...", remote, branch),
        SyncStep::Completed => "Completed".to_string(),
    }
}

pub fn print_working_dir(path: &Path, config: &Config) {
    if config.is_quiet() {
        return;
    }
    println!(
        "{} {}",
        "Working in:".cyan(),
        path.display().to_string().white().bold()
    )
}

pub fn print_summary(report: &SyncReport, config: &Config) {
    if config.is_quiet() {
        print_quiet_summary(report);
    } else {
        print_normal_summary(report);
    }
}

fn print_quiet_summary(report: &SyncReport) {
    let succeeded = report.steps.len() - report.failures().count();
    println!("{}/{} git commands succeeded", succeeded, report.steps.len());
}

fn print_normal_summary(report: &SyncReport) {
    print_section("Summary");

    let succeeded = report.steps.len() - report.failures().count();
    let ratio = format!("{}/{}", succeeded, report.steps.len());
    let ratio = if report.all_succeeded() {
        ratio.green().bold()
    } else {
        ratio.yellow().bold()
    };
    println!(
        "{}: {} git commands succeeded in {}",
        "Total".white().bold(),
        ratio,
        format_duration(report.duration)
    );

    match (&report.message, report.commit_created()) {
        (Some(message), true) => println!("{}: {}", "Committed".green().bold(), message),
        _ => println!("{}", "No commit created".dimmed()),
    }

    if let Some(step) = &report.halted_at {
        println!("{} {}", "Halted at:".red().bold(), step);
    }
}

/// Printed whatever the outcome of the run.
pub fn print_done() {
    println!("\n{}", "Sync finished.".cyan().bold());
}

/// Waits for a key press when attached to a terminal.
pub fn pause(config: &Config) -> anyhow::Result<()> {
    let term = Term::stdout();
    if !config.pause || !term.is_term() {
        return Ok(());
    }
    term.write_line("Press any key to continue...")
        .context("Failed to write prompt")?;
    term.read_key().context("Failed to read key press")?;
    Ok(())
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}

fn print_section(title: &str) {
    let line = "=".repeat(50).cyan().dimmed();
    let padding = (50 - title.len()) / 2;
    let centered = format!("{:>width$}", title, width = padding + title.len());
    println!("\n{}\n{}\n{}\n", line, centered.cyan().bold(), line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitOutput;
    use std::path::PathBuf;

    fn failed(step: SyncStep, code: Option<i32>, stdout: &str) -> StepResult {
        StepResult {
            step,
            outcome: StepOutcome::Failed(GitOutput {
                exit_code: code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        }
    }

    #[test]
    fn test_format_duration_rounds_to_two_decimals() {
        assert_eq!(format_duration(Duration::from_millis(1234)), "1.23s");
        assert_eq!(format_duration(Duration::from_secs(42)), "42.00s");
    }

    #[test]
    fn test_format_step_message_names_remote_and_branch() {
        assert_eq!(
            format_step_message(&SyncStep::CheckingOut {
                branch: "main".to_string()
            }),
            "Checking out main..."
        );
        assert_eq!(
            format_step_message(&SyncStep::Pushing {
                remote: "origin".to_string(),
                branch: "main".to_string()
            }),
            "Pushing to origin/main..."
        );
        assert_eq!(format_step_message(&SyncStep::Staging), "Staging all changes...");
        assert_eq!(format_step_message(&SyncStep::Completed), "Completed");
    }

    #[test]
    fn test_failed_step_lists_exit_code_and_git_output() {
        colored::control::set_override(false);
        let lines = format_step_result(&failed(
            SyncStep::Committing,
            Some(1),
            "On branch main\nnothing to commit, working tree clean\n",
        ));

        assert_eq!(lines[0], "✗ git commit (exit 1)");
        assert_eq!(lines[1], "    On branch main");
        assert_eq!(lines[2], "    nothing to commit, working tree clean");
    }

    #[test]
    fn test_killed_step_has_no_exit_code() {
        colored::control::set_override(false);
        let lines = format_step_result(&failed(SyncStep::Staging, None, ""));
        assert_eq!(lines, vec!["✗ git add . (killed)".to_string()]);
    }

    #[test]
    fn test_summaries_do_not_panic() {
        let report = SyncReport {
            path: PathBuf::from("/test/repo"),
            message: None,
            steps: vec![failed(SyncStep::Committing, Some(1), "")],
            halted_at: Some(SyncStep::Committing),
            duration: Duration::from_millis(500),
        };

        print_quiet_summary(&report);
        print_normal_summary(&report);
    }
}
