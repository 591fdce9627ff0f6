//! Staged diff retrieval by shelling out to `git diff --cached`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{DiffError, RepoError};

/// Source of the staged changeset for a working tree.
///
/// This abstraction allows mocking the git subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Return the staged diff of the working tree at `root`, verbatim.
    async fn staged_diff(&self, root: &Path) -> Result<String, DiffError>;
}

/// Diff source backed by the system `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl GitCli {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific git executable instead of the one on PATH.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiffSource for GitCli {
    async fn staged_diff(&self, root: &Path) -> Result<String, DiffError> {
        debug!(repo = %root.display(), "running git diff --cached");

        // kill_on_drop so a cancelled task does not leave git running.
        let output = Command::new(&self.program)
            .args(["diff", "--cached"])
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(DiffError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DiffError::NonZeroExit {
                code: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Check that a `git` executable is reachable on PATH.
pub fn check_git_installed() -> Result<(), RepoError> {
    which::which("git")
        .map(|_| ())
        .map_err(|_| RepoError::GitNotInstalled)
}
