//! Registry of watched repositories and per-notification task dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

use crate::host::{HostEvent, Repository, RepositoryId};
use crate::shutdown::Shutdown;
use crate::workflow::{Outcome, Scribe};

/// Tally of handled notifications.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl WatchSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written => self.written += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.written + self.skipped + self.failed + self.cancelled
    }
}

/// Watches repositories and spawns one generation task per change.
///
/// Tasks for the same repository are not serialized: a later notification
/// may finish first, and whichever task finishes last owns the field.
pub struct Watcher {
    scribe: Arc<Scribe>,
    registry: HashMap<RepositoryId, Arc<dyn Repository>>,
    shutdown: Shutdown,
    tasks: JoinSet<Outcome>,
    summary: WatchSummary,
}

impl Watcher {
    /// Create a watcher over the repositories known at startup.
    pub fn new(
        scribe: Arc<Scribe>,
        repositories: impl IntoIterator<Item = Arc<dyn Repository>>,
        shutdown: Shutdown,
    ) -> Self {
        let mut watcher = Self {
            scribe,
            registry: HashMap::new(),
            shutdown,
            tasks: JoinSet::new(),
            summary: WatchSummary::default(),
        };
        for repo in repositories {
            watcher.watch(repo);
        }
        watcher
    }

    pub fn watch(&mut self, repo: Arc<dyn Repository>) {
        let id = repo.id();
        debug!(repo = %id, "watching repository");
        self.registry.insert(id, repo);
    }

    pub fn unwatch(&mut self, id: &RepositoryId) -> bool {
        self.registry.remove(id).is_some()
    }

    pub fn is_watching(&self, id: &RepositoryId) -> bool {
        self.registry.contains_key(id)
    }

    pub fn watched(&self) -> usize {
        self.registry.len()
    }

    /// Spawn the workflow for a watched repository.
    ///
    /// Returns false when the repository is not registered.
    pub fn dispatch(&mut self, id: &RepositoryId) -> bool {
        let Some(repo) = self.registry.get(id) else {
            debug!(repo = %id, "change notification for unwatched repository");
            return false;
        };

        let repo = Arc::clone(repo);
        let scribe = Arc::clone(&self.scribe);
        let shutdown = self.shutdown.clone();
        self.tasks
            .spawn(async move { scribe.handle_change(&*repo, &shutdown).await });
        true
    }

    fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Opened(repo) => self.watch(repo),
            HostEvent::Changed(id) => {
                self.dispatch(&id);
            }
            HostEvent::Closed(id) => {
                if self.unwatch(&id) {
                    debug!(repo = %id, "stopped watching repository");
                }
            }
        }
    }

    fn record(&mut self, joined: Result<Outcome, JoinError>) {
        match joined {
            Ok(outcome) => self.summary.record(outcome),
            Err(e) => {
                error!(error = %e, "generation task panicked");
                self.summary.record(Outcome::Failed);
            }
        }
    }

    /// Consume host events until the stream ends or shutdown fires, then
    /// wait for in-flight tasks.
    pub async fn run(mut self, mut events: mpsc::Receiver<HostEvent>) -> WatchSummary {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("shutting down; no longer watching repositories");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.record(joined);
                }
            }
        }

        while let Some(joined) = self.tasks.join_next().await {
            self.record(joined);
        }

        self.registry.clear();
        self.summary
    }
}
