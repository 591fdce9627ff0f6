//! Terminal host: repositories on disk, observed by polling git2 status.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::RepoError;
use crate::git::{self, RepoSnapshot};
use crate::shutdown::Shutdown;

use super::{HostEvent, Repository, RepositoryId};

/// Commit message written into a repository's field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageUpdate {
    pub repo: RepositoryId,
    pub message: String,
}

/// A working tree on the local filesystem.
///
/// The staged count is the value seen by the last [`refresh`](Self::refresh).
/// The commit message field lives in memory; every write is also forwarded
/// to the optional sink so the host can display it.
#[derive(Debug)]
pub struct LocalRepository {
    root: PathBuf,
    staged: AtomicUsize,
    message: Mutex<String>,
    sink: Option<mpsc::UnboundedSender<MessageUpdate>>,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staged: AtomicUsize::new(0),
            message: Mutex::new(String::new()),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: mpsc::UnboundedSender<MessageUpdate>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Re-read repository status and update the cached staged count.
    ///
    /// Blocking; run it on a blocking thread from async code.
    pub fn refresh(&self) -> Result<RepoSnapshot, RepoError> {
        let snapshot = git::snapshot(&self.root)?;
        self.staged.store(snapshot.staged_count(), Ordering::SeqCst);
        Ok(snapshot)
    }
}

impl Repository for LocalRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn staged_count(&self) -> usize {
        self.staged.load(Ordering::SeqCst)
    }

    fn commit_message(&self) -> String {
        self.message
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    fn set_commit_message(&self, message: &str) {
        if let Ok(mut field) = self.message.lock() {
            *field = message.to_string();
        }
        if let Some(sink) = &self.sink {
            let _ = sink.send(MessageUpdate {
                repo: self.id(),
                message: message.to_string(),
            });
        }
    }
}

enum Slot {
    /// Configured path that is not (yet) a repository.
    Pending(PathBuf),
    Open {
        repo: Arc<LocalRepository>,
        last: Option<RepoSnapshot>,
    },
}

/// Polls repository status and turns differences into [`HostEvent`]s.
///
/// Startup repositories are reported as `Changed` on first observation.
/// Pending paths are reported as `Opened` once they become repositories,
/// and open repositories that disappear are reported as `Closed`.
pub struct Poller {
    slots: Vec<Slot>,
    interval: Duration,
    events: mpsc::Sender<HostEvent>,
    sink: Option<mpsc::UnboundedSender<MessageUpdate>>,
}

impl Poller {
    pub fn new(
        startup: Vec<Arc<LocalRepository>>,
        pending: Vec<PathBuf>,
        interval: Duration,
        events: mpsc::Sender<HostEvent>,
    ) -> Self {
        let slots = startup
            .into_iter()
            .map(|repo| Slot::Open { repo, last: None })
            .chain(pending.into_iter().map(Slot::Pending))
            .collect();

        Self {
            slots,
            interval,
            events,
            sink: None,
        }
    }

    /// Attach `sink` to repositories opened after startup.
    pub fn with_sink(mut self, sink: mpsc::UnboundedSender<MessageUpdate>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Poll until shutdown fires or the event receiver goes away.
    pub async fn run(mut self, shutdown: Shutdown) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("poller stopping");
                    return;
                }
                _ = ticker.tick() => {
                    if self.poll_once().await.is_err() {
                        debug!("event receiver closed; poller stopping");
                        return;
                    }
                }
            }
        }
    }

    /// Check every slot once. Errors only when the receiver is gone.
    pub async fn poll_once(&mut self) -> Result<(), mpsc::error::SendError<HostEvent>> {
        for slot in &mut self.slots {
            if let Some(event) = poll_slot(slot, self.sink.as_ref()).await {
                self.events.send(event).await?;
            }
        }
        Ok(())
    }
}

async fn poll_slot(
    slot: &mut Slot,
    sink: Option<&mpsc::UnboundedSender<MessageUpdate>>,
) -> Option<HostEvent> {
    match slot {
        Slot::Pending(path) => {
            let probe = path.clone();
            let ready = tokio::task::spawn_blocking(move || git::is_repository(&probe))
                .await
                .unwrap_or(false);
            if !ready {
                return None;
            }

            info!(repo = %path.display(), "repository opened");
            let mut repo = LocalRepository::new(path.clone());
            if let Some(sink) = sink {
                repo = repo.with_sink(sink.clone());
            }
            let repo = Arc::new(repo);
            let event = HostEvent::Opened(repo.clone());
            *slot = Slot::Open { repo, last: None };
            Some(event)
        }
        Slot::Open { repo, last } => {
            let target = Arc::clone(repo);
            let refreshed = tokio::task::spawn_blocking(move || target.refresh()).await;

            match refreshed {
                Ok(Ok(snapshot)) => {
                    if last.as_ref() == Some(&snapshot) {
                        return None;
                    }
                    debug!(
                        repo = %repo.root().display(),
                        staged = snapshot.staged_count(),
                        "repository state changed"
                    );
                    *last = Some(snapshot);
                    Some(HostEvent::Changed(repo.id()))
                }
                Ok(Err(e)) => {
                    let root = repo.root().to_path_buf();
                    if git::is_repository(&root) {
                        warn!(repo = %root.display(), error = %e, "failed to read repository status");
                        return None;
                    }
                    info!(repo = %root.display(), "repository closed");
                    let id = RepositoryId::new(root.clone());
                    *slot = Slot::Pending(root);
                    Some(HostEvent::Closed(id))
                }
                Err(e) => {
                    warn!(error = %e, "status task failed");
                    None
                }
            }
        }
    }
}
