//! Test infrastructure for auto-sync integration tests.

#![allow(dead_code)]

use anyhow::Result;
use auto_sync::git::run_git;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary git repository on `main` with a bare `origin` remote.
/// Automatically cleaned up when dropped.
pub struct TestRepo {
    _temp_dir: TempDir,
    path: PathBuf,
    remote: TempDir,
}

impl TestRepo {
    /// Creates the repository, commits a README and pushes it to origin.
    pub fn with_remote() -> Result<Self> {
        let remote = TempDir::new()?;
        run_git(remote.path(), &["init", "--bare", "-b", "main"])?;

        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        init_repo(&path)?;

        std::fs::write(path.join("README.md"), "# Test Repo\n")?;
        run_git(&path, &["add", "README.md"])?;
        run_git(&path, &["commit", "-m", "Initial commit"])?;

        run_git(&path, &["remote", "add", "origin", path_str(remote.path())])?;
        run_git(&path, &["push", "-u", "origin", "main"])?;

        Ok(Self {
            _temp_dir: temp_dir,
            path,
            remote,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_file(&self, name: &str, contents: &str) -> Result<()> {
        std::fs::write(self.path.join(name), contents)?;
        Ok(())
    }

    /// Commit hash of `main` in the bare remote.
    pub fn remote_head(&self) -> Result<String> {
        run_git(self.remote.path(), &["rev-parse", "main"])
    }

    pub fn local_head(&self) -> Result<String> {
        run_git(&self.path, &["rev-parse", "HEAD"])
    }

    pub fn last_commit_subject(&self) -> Result<String> {
        run_git(&self.path, &["log", "-1", "--format=%s"])
    }

    pub fn commit_count(&self) -> Result<usize> {
        Ok(run_git(&self.path, &["rev-list", "--count", "HEAD"])?.parse()?)
    }

    /// Pushes one extra commit to origin from a second clone.
    pub fn push_from_other_clone(&self, file: &str) -> Result<()> {
        let other = TempDir::new()?;
        let clone_path = other.path().join("clone");
        run_git(
            other.path(),
            &["clone", path_str(self.remote.path()), "clone"],
        )?;
        configure_identity(&clone_path)?;
        std::fs::write(clone_path.join(file), "from elsewhere\n")?;
        run_git(&clone_path, &["add", file])?;
        run_git(&clone_path, &["commit", "-m", "Remote commit"])?;
        run_git(&clone_path, &["push", "origin", "main"])?;
        Ok(())
    }
}

pub fn init_repo(path: &Path) -> Result<()> {
    run_git(path, &["init", "-b", "main"])?;
    configure_identity(path)
}

fn configure_identity(path: &Path) -> Result<()> {
    run_git(path, &["config", "user.email", "test@example.com"])?;
    run_git(path, &["config", "user.name", "Test User"])?;
    run_git(path, &["config", "commit.gpgsign", "false"])?;
    run_git(path, &["config", "pull.rebase", "false"])?;
    Ok(())
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is valid UTF-8")
}
