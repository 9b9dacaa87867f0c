//! # Sync Queue
//!
//! Single-flight, latest-wins writer for one collection.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            submit(next)                                                 │
//! │   ┌──────┐ ───────────────────────────────► ┌─────────┐                 │
//! │   │ Idle │                                  │ Syncing │◄──┐ submit(n)   │
//! │   └──────┘ ◄─────────────────────────────── └────┬────┘   │ pending = n │
//! │       ▲      batch settled, no pending           │ ───────┘             │
//! │       │                                          │                      │
//! │       │                  batch settled, pending  │                      │
//! │       │            ┌─────────────────────────────┘                      │
//! │       │            ▼                                                    │
//! │       │     diff(pending, snapshot) ──► next batch (still Syncing)      │
//! │                                                                         │
//! │  success: snapshot ← payload                                            │
//! │  failure: visible ← snapshot (rollback), ErrorReporter.add_error(..)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - At most one write batch per collection is in flight.
//! - A payload superseded while a batch runs is dropped, never sent.
//! - Once settled, the backend holds the payload of the last `submit`.
//!
//! Within a batch, deletes go first, then updates, then creates. The first
//! failing step aborts the rest of the batch.
//!
//! Visible state and phase are only published while the queue lock is held,
//! so a rollback can never overwrite a newer submit.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::Instrument;

use gym_core::{diff, Delta, Entity, RepoResult, Repository, Snapshot};

use crate::error::SyncError;
use crate::logging::Logger;
use crate::reporter::ErrorReporter;
use crate::rollback::{RollbackManager, VisibleState};

/// Whether a write batch is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Syncing,
}

struct QueueState<T> {
    phase: SyncPhase,
    pending: Option<Arc<Vec<T>>>,
    snapshot: Arc<Snapshot<T>>,
}

/// Write coordinator for one collection.
pub struct SyncQueue<T> {
    repository: Arc<dyn Repository<T>>,
    state: Mutex<QueueState<T>>,
    visible: VisibleState<T>,
    phase: watch::Sender<SyncPhase>,
    rollback: RollbackManager<T>,
    reporter: ErrorReporter,
    logger: Logger,
    runtime: Handle,
}

impl<T: Entity> SyncQueue<T> {
    /// Creates an idle queue with an empty snapshot.
    ///
    /// Sync cycles are spawned on the runtime the queue is created in, so
    /// [`submit`](Self::submit) may be called from any thread afterwards.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn new(
        repository: Arc<dyn Repository<T>>,
        reporter: ErrorReporter,
        logger: Logger,
    ) -> Self {
        let (visible, _) = watch::channel(Arc::new(Vec::new()));
        let visible = Arc::new(visible);
        let (phase, _) = watch::channel(SyncPhase::Idle);

        SyncQueue {
            repository,
            state: Mutex::new(QueueState {
                phase: SyncPhase::Idle,
                pending: None,
                snapshot: Arc::new(Snapshot::new()),
            }),
            rollback: RollbackManager::new(Arc::clone(&visible)),
            visible,
            phase,
            reporter,
            logger,
            runtime: Handle::current(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Visible State
    // =========================================================================

    /// Current optimistic collection.
    pub fn current(&self) -> Arc<Vec<T>> {
        self.visible.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.visible.subscribe()
    }

    /// Replaces the visible collection without writing anything.
    pub fn record(&self, next: Vec<T>) {
        let _state = self.lock();
        self.visible.send_replace(Arc::new(next));
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Installs a freshly loaded collection as the confirmed baseline.
    pub fn reset_snapshot(&self, items: Vec<T>) {
        self.lock().snapshot = Arc::new(Snapshot::from_items(items));
    }

    /// Last backend-confirmed state.
    pub fn snapshot(&self) -> Arc<Snapshot<T>> {
        Arc::clone(&self.lock().snapshot)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Shows `next` immediately and schedules it to be written.
    ///
    /// Never blocks: while a batch is in flight, `next` replaces any earlier
    /// pending payload and is picked up when that batch settles.
    pub fn submit(self: &Arc<Self>, next: Vec<T>) {
        let payload = Arc::new(next);
        {
            let mut state = self.lock();
            self.visible.send_replace(Arc::clone(&payload));
            if state.phase == SyncPhase::Syncing {
                if state.pending.replace(payload).is_some() {
                    self.logger.warn("Dropped superseded pending payload");
                }
                return;
            }
            state.phase = SyncPhase::Syncing;
            self.phase.send_replace(SyncPhase::Syncing);
        }

        let queue = Arc::clone(self);
        let span = self.logger.span();
        self.runtime
            .spawn(async move { queue.run(payload).await }.instrument(span));
    }

    async fn run(self: Arc<Self>, first: Arc<Vec<T>>) {
        let mut payload = first;
        loop {
            let baseline = self.snapshot();
            let delta = diff(&baseline, &payload);

            let result = if delta.is_empty() {
                self.logger.debug("No changes to sync");
                Ok(())
            } else {
                self.apply(&delta).await
            };

            match self.settle(&payload, &baseline, result) {
                Some(next) => payload = next,
                None => break,
            }
        }
    }

    async fn apply(&self, delta: &Delta<T>) -> RepoResult<()> {
        self.logger.debug(&format!(
            "Syncing delta: {} created, {} updated, {} deleted",
            delta.to_create.len(),
            delta.to_update.len(),
            delta.to_delete.len()
        ));

        if !delta.to_delete.is_empty() {
            self.repository.batch_delete(&delta.to_delete).await?;
        }
        if !delta.to_update.is_empty() {
            self.repository.batch_update(&delta.to_update).await?;
        }
        if !delta.to_create.is_empty() {
            self.repository.batch_create(&delta.to_create).await?;
        }
        Ok(())
    }

    /// Records the outcome of one batch and returns the next payload, if any.
    fn settle(
        &self,
        payload: &Arc<Vec<T>>,
        baseline: &Snapshot<T>,
        result: RepoResult<()>,
    ) -> Option<Arc<Vec<T>>> {
        let mut state = self.lock();

        match result {
            Ok(()) => {
                state.snapshot = Arc::new(Snapshot::from_items(payload.to_vec()));
                if state.pending.is_none() {
                    // Settled on this payload: it must be what readers see.
                    self.visible.send_if_modified(|visible| {
                        if Arc::ptr_eq(visible, payload) {
                            return false;
                        }
                        *visible = Arc::clone(payload);
                        true
                    });
                }
                self.logger.info(&format!("Synced {} items", payload.len()));
            }
            Err(err) => {
                let error = SyncError::from_write(T::KIND, err);
                self.logger.error("Sync failed, rolling back", &error);

                self.rollback.restore(baseline);
                // A newer payload is still what the user asked for; keep it
                // visible while it is retried against the unchanged snapshot.
                if let Some(pending) = &state.pending {
                    self.visible.send_replace(Arc::clone(pending));
                }
                self.reporter.add_error(
                    format!("Failed to save {}", T::KIND),
                    Some(error.to_string()),
                );
            }
        }

        match state.pending.take() {
            Some(next) => Some(next),
            None => {
                state.phase = SyncPhase::Idle;
                self.phase.send_replace(SyncPhase::Idle);
                None
            }
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn phase(&self) -> SyncPhase {
        *self.phase.borrow()
    }

    /// Resolves once no batch is in flight.
    pub async fn settled(&self) {
        let mut rx = self.phase.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|phase| *phase == SyncPhase::Idle).await;
    }
}
