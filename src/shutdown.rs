//! Host teardown signal shared by in-flight generation tasks.

use std::future::Future;

use tokio::sync::watch;

use crate::error::ScribeError;

/// Fires the shutdown signal.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Cloneable view of the shutdown signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Create a linked trigger/signal pair.
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl Shutdown {
    /// A signal that never fires.
    pub fn never() -> Self {
        channel().1
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been triggered.
    ///
    /// If the trigger is dropped without firing, this never resolves.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|triggered| *triggered).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Run `fut` unless shutdown fires first, in which case `fut` is dropped
    /// and `ScribeError::Cancelled` is returned.
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, ScribeError>
    where
        F: Future<Output = Result<T, ScribeError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ScribeError::Cancelled),
            result = fut => result,
        }
    }
}
