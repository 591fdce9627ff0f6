//! Contracts the generator needs from its host environment.
//!
//! A host owns the repositories and their commit-message fields. It tells
//! the watcher about repositories through [`HostEvent`]s and shows errors
//! to the user through a [`Notifier`].

pub mod local;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use local::{LocalRepository, MessageUpdate, Poller};

/// Identity of a repository: its working-tree root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryId(PathBuf);

impl RepositoryId {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<&Path> for RepositoryId {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A repository as exposed by the host's version-control integration.
pub trait Repository: Send + Sync {
    /// Working-tree root, where `git diff --cached` runs.
    fn root(&self) -> &Path;

    fn id(&self) -> RepositoryId {
        RepositoryId::from(self.root())
    }

    /// Number of changes currently staged, as last observed by the host.
    fn staged_count(&self) -> usize;

    /// Current value of the pending commit message field.
    fn commit_message(&self) -> String;

    /// Overwrite the pending commit message field.
    fn set_commit_message(&self, message: &str);
}

/// User-visible notifications.
pub trait Notifier: Send + Sync {
    fn show_error(&self, message: &str);
}

/// Notification from the host about its repositories.
pub enum HostEvent {
    /// A repository was opened after startup.
    Opened(Arc<dyn Repository>),
    /// A repository's state changed.
    Changed(RepositoryId),
    /// A repository was closed and should no longer be watched.
    Closed(RepositoryId),
}

impl fmt::Debug for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::Opened(repo) => f.debug_tuple("Opened").field(&repo.id()).finish(),
            HostEvent::Changed(id) => f.debug_tuple("Changed").field(id).finish(),
            HostEvent::Closed(id) => f.debug_tuple("Closed").field(id).finish(),
        }
    }
}
