//! Git access: staged diffs through the git CLI, index state through git2.

pub mod diff;
pub mod status;

pub use diff::{DiffSource, GitCli, check_git_installed};
pub use status::{RepoSnapshot, is_repository, snapshot, staged_count};
