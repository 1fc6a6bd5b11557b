// Sync pipeline: step types, failure policy, the runner and its report

use crate::constants::{DEFAULT_REMOTE, MAIN_BRANCH};
use crate::git::{self, CommandRunner, GitOutput};
use crate::message::{self, CommitMessage};
use std::fmt;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use time::OffsetDateTime;

/// One stage of the pipeline, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStep {
    CheckingOut { branch: String },
    Pulling { remote: String, branch: String },
    Staging,
    ComposingMessage,
    Committing,
    Pushing { remote: String, branch: String },
    Completed,
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStep::CheckingOut { branch } => write!(f, "git checkout {}", branch),
            SyncStep::Pulling { remote, branch } => write!(f, "git pull {} {}", remote, branch),
            SyncStep::Staging => write!(f, "git add ."),
            SyncStep::ComposingMessage => write!(f, "compose commit message"),
            SyncStep::Committing => write!(f, "git commit"),
            SyncStep::Pushing { remote, branch } => write!(f, "git push {} {}", remote, branch),
            SyncStep::Completed => write!(f, "completed"),
        }
    }
}

/// What happens after a command fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Run every remaining step anyway.
    #[default]
    Continue,
    /// Stop at the first failed command.
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded(GitOutput),
    /// Git ran and exited non-zero (or was killed).
    Failed(GitOutput),
    /// Git could not be run at all.
    SpawnFailed(String),
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub step: SyncStep,
    pub outcome: StepOutcome,
}

impl StepResult {
    fn from_output(step: SyncStep, result: anyhow::Result<GitOutput>) -> Self {
        let outcome = match result {
            Ok(output) if output.success() => StepOutcome::Succeeded(output),
            Ok(output) => StepOutcome::Failed(output),
            Err(e) => StepOutcome::SpawnFailed(format!("{:#}", e)),
        };
        Self { step, outcome }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, StepOutcome::Succeeded(_))
    }

    /// Captured git output, or the error text when git never ran.
    pub fn output_text(&self) -> String {
        match &self.outcome {
            StepOutcome::Succeeded(output) | StepOutcome::Failed(output) => output.combined(),
            StepOutcome::SpawnFailed(error) => error.clone(),
        }
    }
}

#[derive(Debug)]
pub struct SyncReport {
    pub path: PathBuf,
    /// `None` when the pipeline halted before the message was composed.
    pub message: Option<CommitMessage>,
    pub steps: Vec<StepResult>,
    pub halted_at: Option<SyncStep>,
    pub duration: Duration,
}

impl SyncReport {
    pub fn failures(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|s| !s.is_success())
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }

    #[must_use]
    pub fn commit_created(&self) -> bool {
        self.steps
            .iter()
            .any(|s| s.step == SyncStep::Committing && s.is_success())
    }
}

/// Progress hooks for a sync run.
pub trait SyncCallbacks {
    fn on_sync_start(&self, _path: &Path) {}
    /// Called before each step begins.
    fn on_step(&self, step: &SyncStep);
    /// Called after each git command returns.
    fn on_step_finished(&self, _result: &StepResult) {}
    fn on_complete(&self, report: &SyncReport);
}

/// No-op callbacks for when progress tracking is not needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl SyncCallbacks for NoOpCallbacks {
    fn on_step(&self, _step: &SyncStep) {}
    fn on_complete(&self, _report: &SyncReport) {}
}

/// Clock read when the commit message is composed.
pub type Clock = fn() -> OffsetDateTime;

/// Runs checkout, pull, add, commit and push against one working tree.
pub struct SyncRunner<'a> {
    path: PathBuf,
    remote: String,
    branch: String,
    policy: FailurePolicy,
    runner: &'a dyn CommandRunner,
    clock: Clock,
}

impl<'a> SyncRunner<'a> {
    /// Creates a runner for `path` syncing `origin/main`.
    pub fn new(path: &Path, runner: &'a dyn CommandRunner) -> Self {
        Self {
            path: path.to_path_buf(),
            remote: DEFAULT_REMOTE.to_string(),
            branch: MAIN_BRANCH.to_string(),
            policy: FailurePolicy::default(),
            runner,
            clock: message::local_now,
        }
    }

    pub fn with_remote(mut self, remote: &str) -> anyhow::Result<Self> {
        git::validate_ref_name("remote", remote)?;
        self.remote = remote.to_string();
        Ok(self)
    }

    pub fn with_branch(mut self, branch: &str) -> anyhow::Result<Self> {
        git::validate_ref_name("branch", branch)?;
        self.branch = branch.to_string();
        Ok(self)
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn run<C>(&self, callbacks: &C) -> SyncReport
    where
        C: SyncCallbacks + ?Sized,
    {
        let start = Instant::now();
        callbacks.on_sync_start(&self.path);

        let mut report = SyncReport {
            path: self.path.clone(),
            message: None,
            steps: Vec::with_capacity(5),
            halted_at: None,
            duration: Duration::ZERO,
        };

        if let ControlFlow::Break(step) = self.do_run(callbacks, &mut report) {
            report.halted_at = Some(step);
        }

        callbacks.on_step(&SyncStep::Completed);
        report.duration = start.elapsed();
        callbacks.on_complete(&report);
        report
    }

    /// Breaks with the failed step only under [`FailurePolicy::Halt`].
    fn do_run<C>(&self, callbacks: &C, report: &mut SyncReport) -> ControlFlow<SyncStep>
    where
        C: SyncCallbacks + ?Sized,
    {
        let repo = self.path.as_path();
        let runner = self.runner;

        self.execute(
            callbacks,
            report,
            SyncStep::CheckingOut {
                branch: self.branch.clone(),
            },
            || git::checkout(runner, repo, &self.branch),
        )?;

        self.execute(
            callbacks,
            report,
            SyncStep::Pulling {
                remote: self.remote.clone(),
                branch: self.branch.clone(),
            },
            || git::pull(runner, repo, &self.remote, &self.branch),
        )?;

        self.execute(callbacks, report, SyncStep::Staging, || {
            git::add_all(runner, repo)
        })?;

        callbacks.on_step(&SyncStep::ComposingMessage);
        let composed = CommitMessage::at((self.clock)());
        report.message = composed.as_ref().ok().cloned();

        self.execute(callbacks, report, SyncStep::Committing, || match composed {
            Ok(message) => git::commit(runner, repo, message.as_str()),
            Err(e) => Err(e.context("Failed to compose commit message")),
        })?;

        self.execute(
            callbacks,
            report,
            SyncStep::Pushing {
                remote: self.remote.clone(),
                branch: self.branch.clone(),
            },
            || git::push(runner, repo, &self.remote, &self.branch),
        )?;

        ControlFlow::Continue(())
    }

    fn execute<C, F>(
        &self,
        callbacks: &C,
        report: &mut SyncReport,
        step: SyncStep,
        command: F,
    ) -> ControlFlow<SyncStep>
    where
        C: SyncCallbacks + ?Sized,
        F: FnOnce() -> anyhow::Result<GitOutput>,
    {
        callbacks.on_step(&step);
        let result = StepResult::from_output(step, command());
        callbacks.on_step_finished(&result);

        let halt = !result.is_success() && self.policy == FailurePolicy::Halt;
        let step = result.step.clone();
        report.steps.push(result);

        if halt {
            return ControlFlow::Break(step);
        }
        ControlFlow::Continue(())
    }
}
