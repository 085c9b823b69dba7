use parking_lot::Mutex as SyncMutex;
use plate_catalog_api::domain::plate::Plate;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auditing::PlateAuditInterceptor;

/// Cloneable handle to the unit of work's transaction and change tracker.
///
/// Every repository created from a unit of work shares one executor, so all
/// reads and writes in the session run on the same transaction and feed the
/// same tracker.
#[derive(Clone)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
    pub tracker: Arc<SyncMutex<ChangeTracker>>,
}

struct TrackedEntry {
    original: Plate,
    current: Plate,
    modified: bool,
}

/// Per-transaction record of plate snapshots.
///
/// `track` registers the original values of a plate when it is first loaded;
/// `mark_modified` records the current values written by an update. Only
/// modified entries are diffed by the pre-commit capture hook, always against
/// the snapshot taken at load time.
#[derive(Default)]
pub struct ChangeTracker {
    entries: HashMap<Uuid, TrackedEntry>,
}

impl ChangeTracker {
    /// Register the as-loaded snapshot. A plate loaded twice in one
    /// transaction keeps its first snapshot.
    pub fn track(&mut self, plate: &Plate) {
        self.entries.entry(plate.id).or_insert_with(|| TrackedEntry {
            original: plate.clone(),
            current: plate.clone(),
            modified: false,
        });
    }

    /// Record the current values of an updated plate and flag it for diffing.
    /// An update without a prior load diffs against itself and produces no
    /// deltas.
    pub fn mark_modified(&mut self, plate: &Plate) {
        let entry = self.entries.entry(plate.id).or_insert_with(|| TrackedEntry {
            original: plate.clone(),
            current: plate.clone(),
            modified: false,
        });
        entry.current = plate.clone();
        entry.modified = true;
    }

    /// (original, current) pairs for every entry flagged as modified.
    pub fn modified_snapshots(&self) -> Vec<(Plate, Plate)> {
        self.entries
            .values()
            .filter(|e| e.modified)
            .map(|e| (e.original.clone(), e.current.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One atomic business write, with the audit capture/flush hooks bound to its
/// lifecycle.
///
/// `commit` runs capture (pre-commit, never able to fail the write), then the
/// sql COMMIT, then flush (post-commit, fire-and-forget publish). Dropping or
/// rolling back the unit of work rolls the transaction back and discards any
/// pending audit items for this transaction id, so the pending buffer never
/// outlives its transaction.
pub struct UnitOfWork {
    tx_id: Uuid,
    executor: Executor,
    interceptor: Arc<PlateAuditInterceptor>,
    completed: bool,
}

impl UnitOfWork {
    pub async fn begin(
        pool: &PgPool,
        interceptor: Arc<PlateAuditInterceptor>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let tx = pool.begin().await?;
        Ok(Self {
            tx_id: Uuid::new_v4(),
            executor: Executor {
                tx: Arc::new(Mutex::new(Some(tx))),
                tracker: Arc::new(SyncMutex::new(ChangeTracker::default())),
            },
            interceptor,
            completed: false,
        })
    }

    /// Identity of this transaction; keys the interceptor's pending buffer.
    pub fn tx_id(&self) -> Uuid {
        self.tx_id
    }

    pub fn executor(&self) -> Executor {
        self.executor.clone()
    }

    /// Capture, COMMIT, flush.
    ///
    /// Capture failures are logged inside the interceptor and never propagate;
    /// a failed COMMIT discards the captured items instead of flushing them.
    pub async fn commit(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.interceptor.capture(self.tx_id, &self.executor.tracker);

        let tx = self
            .executor
            .tx
            .lock()
            .await
            .take()
            .ok_or("Transaction has been consumed")?;

        self.completed = true;
        match tx.commit().await {
            Ok(()) => {
                self.interceptor.flush(self.tx_id);
                Ok(())
            }
            Err(e) => {
                self.interceptor.discard(self.tx_id);
                Err(e.into())
            }
        }
    }

    /// Roll the transaction back and drop any pending audit items.
    pub async fn rollback(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let tx = self
            .executor
            .tx
            .lock()
            .await
            .take()
            .ok_or("Transaction has been consumed")?;

        self.completed = true;
        self.interceptor.discard(self.tx_id);
        tx.rollback().await?;
        Ok(())
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        // The sqlx transaction rolls itself back when dropped; the pending
        // buffer entry has to be removed explicitly.
        if !self.completed {
            self.interceptor.discard(self.tx_id);
        }
    }
}
