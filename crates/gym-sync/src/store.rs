//! # Entity Store
//!
//! Optimistic in-memory view of one collection.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  new() ──► Loading ──── get_all ok ────► Ready                          │
//! │              │   │                         │                            │
//! │       set()  │   └─ get_all err ─► Failed  │ set() ──► SyncQueue.submit │
//! │  (recorded,  │                     │       │                            │
//! │   no writes) │        load() again ┘       │                            │
//! │              ▼                             │                            │
//! │   sets made while loading become the first delta against the loaded    │
//! │   snapshot once Ready                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A store must be created inside a Tokio runtime; after that, writes may be
//! issued from any thread.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use gym_core::factory::{add_to, remove_from, touch, update_in};
use gym_core::validation::{Validate, ValidationResult};
use gym_core::{Entity, Repository, Snapshot};

use crate::error::{SyncError, SyncResult};
use crate::logging::Logger;
use crate::queue::{SyncPhase, SyncQueue};
use crate::reporter::ErrorReporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    /// `dirty` is set once `set()` was called before the load finished.
    Loading { dirty: bool },
    Failed { dirty: bool },
    Ready,
}

/// Optimistic collection backed by a repository.
pub struct EntityStore<T> {
    repository: Arc<dyn Repository<T>>,
    queue: Arc<SyncQueue<T>>,
    state: Mutex<LoadState>,
    reporter: ErrorReporter,
    logger: Logger,
}

impl<T: Entity> EntityStore<T> {
    /// Creates an empty store in the loading state. Call [`load`](Self::load)
    /// to fetch the collection.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime; sync cycles are spawned on
    /// the runtime captured here.
    pub fn new(repository: Arc<dyn Repository<T>>, reporter: ErrorReporter, logger: &Logger) -> Self {
        let logger = logger.child(T::KIND.collection_name());
        let queue = Arc::new(SyncQueue::new(
            Arc::clone(&repository),
            reporter.clone(),
            logger.clone(),
        ));

        EntityStore {
            repository,
            queue,
            state: Mutex::new(LoadState::Loading { dirty: false }),
            reporter,
            logger,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetches the collection and installs it as the sync baseline.
    ///
    /// On failure the collection stays as it was, the error is reported, and
    /// nothing is retried until `load` is called again. Once loaded, the
    /// store owns the baseline and further calls do nothing.
    pub async fn load(&self) -> SyncResult<()> {
        {
            let mut state = self.lock();
            let dirty = match *state {
                LoadState::Loading { dirty } | LoadState::Failed { dirty } => dirty,
                LoadState::Ready => {
                    self.logger.debug("Already loaded");
                    return Ok(());
                }
            };
            *state = LoadState::Loading { dirty };
        }

        match self.repository.get_all().await {
            Ok(items) => {
                let mut state = self.lock();
                let dirty = matches!(*state, LoadState::Loading { dirty: true });
                let count = items.len();

                self.queue.reset_snapshot(items.clone());
                *state = LoadState::Ready;
                if dirty {
                    self.logger.debug("Syncing changes made while loading");
                    self.queue.submit(self.queue.current().to_vec());
                } else {
                    self.queue.record(items);
                }

                self.logger.info(&format!("Loaded {count} items"));
                Ok(())
            }
            Err(source) => {
                {
                    let mut state = self.lock();
                    let dirty = matches!(*state, LoadState::Loading { dirty: true });
                    *state = LoadState::Failed { dirty };
                }

                self.logger.error("Load failed", &source);
                self.reporter.add_error(
                    format!("Failed to load {}", T::KIND),
                    Some(source.to_string()),
                );
                Err(SyncError::Load {
                    collection: T::KIND,
                    source,
                })
            }
        }
    }

    /// Current optimistic collection.
    pub fn get(&self) -> Arc<Vec<T>> {
        self.queue.current()
    }

    /// Replaces the collection and schedules it to be written.
    ///
    /// Returns immediately and may be called from any thread. Before the
    /// first successful load the new value is only kept in memory.
    pub fn set(&self, next: Vec<T>) {
        let mut state = self.lock();
        match *state {
            LoadState::Ready => self.queue.submit(next),
            LoadState::Loading { .. } => {
                *state = LoadState::Loading { dirty: true };
                self.queue.record(next);
            }
            LoadState::Failed { .. } => {
                *state = LoadState::Failed { dirty: true };
                self.queue.record(next);
            }
        }
    }

    /// Applies `change` to the current collection and sets the result.
    pub fn modify(&self, change: impl FnOnce(&[T]) -> Vec<T>) {
        let next = change(&self.get());
        self.set(next);
    }

    /// Removes the entry with `id`, if present.
    pub fn remove(&self, id: &str) {
        self.modify(|items| remove_from(items, id));
    }

    /// True until the first load succeeds.
    pub fn is_loading(&self) -> bool {
        !matches!(*self.lock(), LoadState::Ready)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.queue.subscribe()
    }

    /// Resolves once no write batch is in flight.
    pub async fn settled(&self) {
        self.queue.settled().await
    }

    pub fn is_syncing(&self) -> bool {
        self.queue.phase() == SyncPhase::Syncing
    }

    /// Last backend-confirmed state.
    pub fn snapshot(&self) -> Arc<Snapshot<T>> {
        self.queue.snapshot()
    }

    pub fn repository(&self) -> &Arc<dyn Repository<T>> {
        &self.repository
    }
}

impl<T: Entity + Validate> EntityStore<T> {
    /// Validates `item` and appends it.
    pub fn insert(&self, item: T) -> ValidationResult<T> {
        item.validate()?;
        self.modify(|items| add_to(items, item.clone()));
        Ok(item)
    }

    /// Validates `item` and replaces the entry with the same id, bumping
    /// its `updatedAt`.
    pub fn replace(&self, item: T) -> ValidationResult<T> {
        item.validate()?;
        let item = touch(item);
        let next = item.clone();
        self.modify(|items| update_in(items, item.id(), |_| next));
        Ok(item)
    }
}
