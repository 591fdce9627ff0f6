//! Index state inspection with git2.

use std::path::Path;
use std::time::SystemTime;

use git2::{Repository, Status, StatusOptions};

use crate::error::RepoError;

/// Status bits that mean "marked for the next commit".
const STAGED: Status = Status::INDEX_NEW
    .union(Status::INDEX_MODIFIED)
    .union(Status::INDEX_DELETED)
    .union(Status::INDEX_RENAMED)
    .union(Status::INDEX_TYPECHANGE);

/// Point-in-time view of a repository's status, used to detect changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSnapshot {
    /// Path and raw status bits for every non-clean entry, sorted by path.
    pub entries: Vec<(String, u32)>,
    /// Modification time of `.git/index`; catches re-staging a modified file.
    pub index_mtime: Option<SystemTime>,
}

impl RepoSnapshot {
    /// Number of entries with staged changes.
    pub fn staged_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, bits)| Status::from_bits_truncate(*bits).intersects(STAGED))
            .count()
    }
}

/// Whether `path` is the root of a git working tree.
pub fn is_repository(path: &Path) -> bool {
    Repository::open(path).is_ok_and(|repo| !repo.is_bare())
}

fn open(path: &Path) -> Result<Repository, RepoError> {
    Repository::open(path).map_err(|source| RepoError::OpenRepository {
        path: path.display().to_string(),
        source,
    })
}

fn status_options() -> StatusOptions {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(false)
        .include_ignored(false)
        .renames_head_to_index(true);
    opts
}

/// Capture the current status of the repository at `path`.
pub fn snapshot(path: &Path) -> Result<RepoSnapshot, RepoError> {
    let repo = open(path)?;
    let mut opts = status_options();
    let statuses = repo.statuses(Some(&mut opts)).map_err(RepoError::Statuses)?;

    let mut entries: Vec<(String, u32)> = statuses
        .iter()
        .map(|entry| {
            let path = entry.path().unwrap_or_default().to_string();
            (path, entry.status().bits())
        })
        .collect();
    entries.sort();

    let index_mtime = std::fs::metadata(repo.path().join("index"))
        .and_then(|m| m.modified())
        .ok();

    Ok(RepoSnapshot {
        entries,
        index_mtime,
    })
}

/// Count staged entries in the repository at `path`.
pub fn staged_count(path: &Path) -> Result<usize, RepoError> {
    snapshot(path).map(|s| s.staged_count())
}
