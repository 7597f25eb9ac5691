//! The mirror dispatcher: replicates ledger mutations to a backend without
//! blocking the interactive path.
//!
//! Mutations are enqueued on an unbounded channel and applied by a single
//! worker task, so operations are applied in exactly the order they were
//! issued; in particular, a removal enqueued after a push for the same
//! entry id can never be applied ahead of it. Backend failures are logged
//! and swallowed: the in-memory mutation has already committed and is never
//! rolled back.

use crate::model::{EntryId, LedgerEntry};
use crate::persist::{day_key, Backend, BucketRecord};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// One replicated mutation, addressed by its bucket key.
#[derive(Debug)]
enum MirrorOp {
    Push { key: String, record: BucketRecord },
    Remove { key: String, id: EntryId },
}

/// Handle to the mirroring worker. Attach it to a ledger with
/// [`crate::ledger::Ledger::attach_mirror`]; call [`Mirror::close`] to drain
/// the queue before shutdown.
pub struct Mirror {
    tx: mpsc::UnboundedSender<MirrorOp>,
    worker: JoinHandle<()>,
}

impl std::fmt::Debug for Mirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mirror").finish_non_exhaustive()
    }
}

impl Mirror {
    /// Spawns the worker task over `backend`. Must be called within a tokio
    /// runtime.
    pub fn attach(backend: Arc<dyn Backend>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                apply(backend.as_ref(), op).await;
            }
        });
        Self { tx, worker }
    }

    /// Enqueues a push of `entry` to the bucket of the day it was added.
    pub(crate) fn push(&self, entry: &LedgerEntry) {
        let op = MirrorOp::Push {
            key: day_key(entry.added().date_naive()),
            record: BucketRecord::from(entry),
        };
        self.send(op);
    }

    /// Enqueues removal of `entry` from the bucket it was pushed to.
    pub(crate) fn remove(&self, entry: &LedgerEntry) {
        let op = MirrorOp::Remove {
            key: day_key(entry.added().date_naive()),
            id: entry.id(),
        };
        self.send(op);
    }

    fn send(&self, op: MirrorOp) {
        trace!("enqueueing {op:?}");
        if self.tx.send(op).is_err() {
            warn!("mirror worker is gone; mutation not replicated");
        }
    }

    /// Closes the queue and waits for the worker to drain it.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            warn!("mirror worker ended abnormally: {e}");
        }
    }
}

/// Applies one operation, logging instead of failing: mirroring is
/// best-effort and must not disturb the committed in-memory state.
async fn apply(backend: &dyn Backend, op: MirrorOp) {
    let result = match &op {
        MirrorOp::Push { key, record } => match backend.ensure_bucket(key).await {
            Ok(bucket) => backend.push_item(&bucket, record).await,
            Err(e) => Err(e),
        },
        MirrorOp::Remove { key, id } => match backend.ensure_bucket(key).await {
            Ok(bucket) => backend.remove_item(&bucket, *id).await,
            Err(e) => Err(e),
        },
    };
    if let Err(e) = result {
        warn!("failed to mirror {op:?}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{IdPolicy, Ledger};
    use crate::model::Mode;
    use crate::persist::MemoryBackend;
    use chrono::Utc;

    #[tokio::test]
    async fn test_mutations_are_mirrored_in_order() {
        let backend = Arc::new(MemoryBackend::new());
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        ledger.attach_mirror(Mirror::attach(backend.clone()));

        let first = ledger.add("Apples", "10.19", true, true, Mode::Add).unwrap().id();
        ledger.add("Milk", "1.20", false, false, Mode::Add).unwrap();
        ledger.delete(&[first]);

        ledger.detach_mirror().unwrap().close().await;

        let key = day_key(Utc::now().date_naive());
        let items = backend.items(&key);
        assert_eq!(items.len(), 1, "push then remove leaves only the second entry");
        assert_eq!(items[0].item_id, 2);
        assert_eq!(items[0].product, "Milk");
        assert_eq!(items[0].cost, "1.20");
    }

    #[tokio::test]
    async fn test_backend_failure_does_not_disturb_the_ledger() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_failing(true);
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        ledger.attach_mirror(Mirror::attach(backend.clone()));

        ledger.add("Apples", "2.00", false, false, Mode::Add).unwrap();
        ledger.detach_mirror().unwrap().close().await;

        // The in-memory mutation committed even though nothing was mirrored.
        assert_eq!(ledger.len(), 1);
        assert_eq!(backend.bucket_count(), 0);
    }

    #[tokio::test]
    async fn test_ledger_without_mirror_is_unaffected() {
        let mut ledger = Ledger::new(IdPolicy::Monotonic);
        ledger.add("Apples", "2.00", false, false, Mode::Add).unwrap();
        assert!(ledger.detach_mirror().is_none());
    }
}
