//! The per-notification workflow: staged check, diff, generate, write.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::ScribeError;
use crate::git::DiffSource;
use crate::host::{Notifier, Repository};
use crate::llm::MessageGenerator;
use crate::shutdown::Shutdown;

/// How a single change notification was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing staged; no diff, no request.
    Skipped,
    /// The commit message field was overwritten.
    Written,
    /// A failure was shown to the user; the field is untouched.
    Failed,
    /// Host teardown interrupted the task; logged only.
    Cancelled,
}

/// Drafts commit messages for repositories with staged changes.
pub struct Scribe {
    diffs: Arc<dyn DiffSource>,
    generator: MessageGenerator,
    notifier: Arc<dyn Notifier>,
}

impl Scribe {
    pub fn new(
        diffs: Arc<dyn DiffSource>,
        generator: MessageGenerator,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            diffs,
            generator,
            notifier,
        }
    }

    /// Handle one state-change notification for `repo`.
    ///
    /// Failures never escape: they are shown through the notifier, except
    /// cancellations, which are only logged.
    pub async fn handle_change(&self, repo: &dyn Repository, shutdown: &Shutdown) -> Outcome {
        let id = repo.id();
        let staged = repo.staged_count();
        if staged == 0 {
            debug!(repo = %id, "no staged changes");
            return Outcome::Skipped;
        }

        debug!(repo = %id, staged, "drafting commit message");

        match self.draft(repo, shutdown).await {
            Ok(message) => {
                repo.set_commit_message(&message);
                info!(repo = %id, len = message.len(), "commit message updated");
                Outcome::Written
            }
            Err(e) if e.is_cancellation() => {
                info!(repo = %id, "Operation canceled: {}", e);
                Outcome::Cancelled
            }
            Err(e) => {
                warn!(repo = %id, error = %e, "commit message generation failed");
                self.notifier
                    .show_error(&format!("Error generating commit message: {}", e));
                Outcome::Failed
            }
        }
    }

    /// Fetch the staged diff and generate a message for it.
    pub async fn draft(
        &self,
        repo: &dyn Repository,
        shutdown: &Shutdown,
    ) -> Result<String, ScribeError> {
        let diff = shutdown
            .guard(async {
                self.diffs
                    .staged_diff(repo.root())
                    .await
                    .map_err(ScribeError::from)
            })
            .await?;

        shutdown.guard(self.generator.generate(&diff)).await
    }
}
