//! # In-Memory Repository
//!
//! [`Repository`] double for exercising stores and queues without a backend.
//!
//! - Failure injection per operation: [`fail_next`](MemoryRepository::fail_next)
//!   fails one call, [`fail_always`](MemoryRepository::fail_always) fails
//!   every call until [`heal`](MemoryRepository::heal).
//! - Call recording, including the ids each call touched.
//! - A gate ([`hold`](MemoryRepository::hold) / [`release`](MemoryRepository::release))
//!   that parks calls mid-flight, plus in-flight accounting, so tests can
//!   observe overlapping writes.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use gym_core::{Entity, RepoError, RepoResult, Repository};

/// Repository operation, as recorded and as targeted by failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoOp {
    GetAll,
    GetById,
    Create,
    Update,
    Delete,
    Clear,
    BatchCreate,
    BatchUpdate,
    BatchDelete,
}

impl RepoOp {
    pub fn is_write(&self) -> bool {
        !matches!(self, RepoOp::GetAll | RepoOp::GetById)
    }
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCall {
    pub op: RepoOp,
    /// Ids the call addressed, in argument order.
    pub ids: Vec<String>,
}

struct Failure {
    op: RepoOp,
    error: RepoError,
    sticky: bool,
}

struct Inner<T> {
    items: Vec<T>,
    calls: Vec<RepoCall>,
    failures: Vec<Failure>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Shared in-memory collection. Clones share state.
pub struct MemoryRepository<T> {
    inner: Arc<Mutex<Inner<T>>>,
    gate: Arc<watch::Sender<bool>>,
    started: Arc<watch::Sender<usize>>,
}

impl<T> Clone for MemoryRepository<T> {
    fn clone(&self) -> Self {
        MemoryRepository {
            inner: Arc::clone(&self.inner),
            gate: Arc::clone(&self.gate),
            started: Arc::clone(&self.started),
        }
    }
}

impl<T: Entity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::with_items(Vec::new())
    }
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<T>) -> Self {
        let (gate, _) = watch::channel(false);
        let (started, _) = watch::channel(0);
        MemoryRepository {
            inner: Arc::new(Mutex::new(Inner {
                items,
                calls: Vec::new(),
                failures: Vec::new(),
                in_flight: 0,
                max_in_flight: 0,
            })),
            gate: Arc::new(gate),
            started: Arc::new(started),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Test Controls
    // =========================================================================

    /// Fails the next call of `op` with a network error.
    pub fn fail_next(&self, op: RepoOp) {
        self.fail_next_with(op, RepoError::Network("injected failure".into()));
    }

    pub fn fail_next_with(&self, op: RepoOp, error: RepoError) {
        self.lock().failures.push(Failure {
            op,
            error,
            sticky: false,
        });
    }

    /// Fails every call of `op` until [`heal`](Self::heal).
    pub fn fail_always(&self, op: RepoOp) {
        self.lock().failures.push(Failure {
            op,
            error: RepoError::Network("injected failure".into()),
            sticky: true,
        });
    }

    pub fn heal(&self) {
        self.lock().failures.clear();
    }

    /// Parks every subsequent call until [`release`](Self::release).
    pub fn hold(&self) {
        self.gate.send_replace(true);
    }

    pub fn release(&self) {
        self.gate.send_replace(false);
    }

    /// Waits until at least `count` calls have started.
    pub async fn wait_for_calls(&self, count: usize) {
        let mut rx = self.started.subscribe();
        let _ = rx.wait_for(|started| *started >= count).await;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.lock().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<RepoCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.op.is_write())
            .cloned()
            .collect()
    }

    /// Forgets recorded calls and resets the started-call counter.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
        self.started.send_replace(0);
    }

    /// Highest number of calls that were in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    // =========================================================================
    // Call Plumbing
    // =========================================================================

    async fn call<R>(
        &self,
        op: RepoOp,
        ids: Vec<String>,
        body: impl FnOnce(&mut Vec<T>) -> RepoResult<R> + Send,
    ) -> RepoResult<R> {
        {
            let mut inner = self.lock();
            inner.calls.push(RepoCall { op, ids });
            inner.in_flight += 1;
            inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
        }
        self.started.send_modify(|started| *started += 1);

        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|held| !*held).await;

        let mut inner = self.lock();
        inner.in_flight -= 1;

        let injected = inner.failures.iter().position(|failure| failure.op == op);
        if let Some(pos) = injected {
            let error = inner.failures[pos].error.clone();
            if !inner.failures[pos].sticky {
                inner.failures.remove(pos);
            }
            return Err(error);
        }

        body(&mut inner.items)
    }
}

fn missing<T: Entity>(id: &str) -> RepoError {
    RepoError::not_found(T::KIND.collection_name(), id)
}

fn upsert<T: Entity>(items: &mut Vec<T>, item: &T) {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(slot) => *slot = item.clone(),
        None => items.push(item.clone()),
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn get_all(&self) -> RepoResult<Vec<T>> {
        self.call(RepoOp::GetAll, Vec::new(), |items| Ok(items.clone()))
            .await
    }

    async fn get_by_id(&self, id: &str) -> RepoResult<Option<T>> {
        self.call(RepoOp::GetById, vec![id.to_string()], |items| {
            Ok(items.iter().find(|item| item.id() == id).cloned())
        })
        .await
    }

    async fn create(&self, item: &T) -> RepoResult<T> {
        self.call(RepoOp::Create, vec![item.id().to_string()], |items| {
            upsert(items, item);
            Ok(item.clone())
        })
        .await
    }

    async fn update(&self, id: &str, item: &T) -> RepoResult<T> {
        self.call(RepoOp::Update, vec![id.to_string()], |items| {
            let slot = items
                .iter_mut()
                .find(|existing| existing.id() == id)
                .ok_or_else(|| missing::<T>(id))?;
            *slot = item.clone();
            Ok(item.clone())
        })
        .await
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        self.call(RepoOp::Delete, vec![id.to_string()], |items| {
            items.retain(|existing| existing.id() != id);
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> RepoResult<()> {
        self.call(RepoOp::Clear, Vec::new(), |items| {
            items.clear();
            Ok(())
        })
        .await
    }

    async fn batch_create(&self, batch: &[T]) -> RepoResult<Vec<T>> {
        let ids = batch.iter().map(|item| item.id().to_string()).collect();
        self.call(RepoOp::BatchCreate, ids, |items| {
            for item in batch {
                upsert(items, item);
            }
            Ok(batch.to_vec())
        })
        .await
    }

    async fn batch_update(&self, batch: &[T]) -> RepoResult<Vec<T>> {
        let ids = batch.iter().map(|item| item.id().to_string()).collect();
        self.call(RepoOp::BatchUpdate, ids, |items| {
            if let Some(absent) = batch
                .iter()
                .find(|item| !items.iter().any(|existing| existing.id() == item.id()))
            {
                return Err(missing::<T>(absent.id()));
            }
            for item in batch {
                upsert(items, item);
            }
            Ok(batch.to_vec())
        })
        .await
    }

    async fn batch_delete(&self, ids: &[String]) -> RepoResult<()> {
        self.call(RepoOp::BatchDelete, ids.to_vec(), |items| {
            items.retain(|existing| !ids.iter().any(|id| id == existing.id()));
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gym_core::factory::new_exercise_type;
    use gym_core::ExerciseType;

    #[tokio::test]
    async fn test_fail_next_fails_once() {
        let repo = MemoryRepository::<ExerciseType>::new();
        repo.fail_next(RepoOp::Create);

        let squat = new_exercise_type("Squat");
        assert!(repo.create(&squat).await.is_err());
        assert!(repo.create(&squat).await.is_ok());
        assert_eq!(repo.items(), vec![squat]);
        assert_eq!(repo.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_always_until_healed() {
        let repo = MemoryRepository::<ExerciseType>::new();
        repo.fail_always(RepoOp::GetAll);
        assert!(repo.get_all().await.is_err());
        assert!(repo.get_all().await.is_err());
        repo.heal();
        assert!(repo.get_all().await.is_ok());
    }

    #[tokio::test]
    async fn test_hold_parks_calls() {
        let repo = MemoryRepository::<ExerciseType>::new();
        repo.hold();

        let background = repo.clone();
        let squat = new_exercise_type("Squat");
        let task = tokio::spawn(async move { background.create(&squat).await });

        repo.wait_for_calls(1).await;
        assert!(repo.items().is_empty());

        repo.release();
        task.await.unwrap().unwrap();
        assert_eq!(repo.items().len(), 1);
        assert_eq!(repo.max_in_flight(), 1);
    }
}
