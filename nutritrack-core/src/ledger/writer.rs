//! Background persistence for the ledger.
//!
//! Every save is queued on a single task, so writes land in the order they
//! were issued and the last one wins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::storage::{KeyValueStore, StorageError};

enum WriteJob {
    Save {
        payload: String,
        done: oneshot::Sender<Result<(), StorageError>>,
    },
    Flush(oneshot::Sender<()>),
}

/// Completion handle for one background write.
///
/// Dropping it does not cancel the write.
#[derive(Debug)]
pub struct PendingWrite {
    done: oneshot::Receiver<Result<(), StorageError>>,
}

impl PendingWrite {
    pub(crate) fn failed(error: StorageError) -> Self {
        let (tx, done) = oneshot::channel();
        let _ = tx.send(Err(error));
        Self { done }
    }

    /// Waits for the write to finish and reports its outcome.
    pub async fn wait(self) -> Result<(), StorageError> {
        match self.done.await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Interrupted),
        }
    }
}

pub(crate) struct Writer {
    jobs: mpsc::UnboundedSender<WriteJob>,
    pending: Arc<AtomicUsize>,
}

impl Writer {
    pub(crate) fn spawn(handle: &Handle, store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        let (jobs, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        handle.spawn(run(rx, store, key, pending.clone()));
        Self { jobs, pending }
    }

    pub(crate) fn save(&self, payload: String) -> PendingWrite {
        let (tx, done) = oneshot::channel();
        self.pending.fetch_add(1, Ordering::SeqCst);

        if self.jobs.send(WriteJob::Save { payload, done: tx }).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!("Ledger writer has stopped; change kept in memory only");
        }

        PendingWrite { done }
    }

    pub(crate) async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.jobs.send(WriteJob::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

async fn run(
    mut jobs: mpsc::UnboundedReceiver<WriteJob>,
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    pending: Arc<AtomicUsize>,
) {
    while let Some(job) = jobs.recv().await {
        match job {
            WriteJob::Save { payload, done } => {
                let store = store.clone();
                let bytes = payload.len();
                let result = tokio::task::spawn_blocking(move || store.set(key, &payload))
                    .await
                    .unwrap_or(Err(StorageError::Interrupted));

                match &result {
                    Ok(()) => tracing::debug!(key, bytes, "Persisted meal ledger"),
                    Err(e) => tracing::warn!(key, error = %e, "Failed to persist meal ledger"),
                }

                pending.fetch_sub(1, Ordering::SeqCst);
                let _ = done.send(result);
            }
            WriteJob::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
