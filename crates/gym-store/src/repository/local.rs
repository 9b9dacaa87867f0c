//! # Local Collection Repository
//!
//! Stores a whole collection as one JSON array under `<namespace>:<collection>`.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create / update / delete / batch_*                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock (per repository, shared by clones)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kv.get(key) ──► decode ──► modify Vec<T> ──► encode ──► kv.set(key)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock makes each read-modify-write atomic with respect to other writes
//! through the same repository. Batches modify the decoded collection once
//! and write it once, so a failed batch leaves the stored value untouched.

use async_trait::async_trait;
use chrono::Utc;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use gym_core::{Entity, RepoError, RepoResult, Repository};

use crate::codec::{decode_collection, encode_collection};
use crate::error::StoreResult;
use crate::repository::kv::KvRepository;

/// Repository for one collection in the on-device store.
#[derive(Debug)]
pub struct LocalRepository<T> {
    kv: KvRepository,
    key: String,
    write_lock: Arc<Mutex<()>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for LocalRepository<T> {
    fn clone(&self) -> Self {
        LocalRepository {
            kv: self.kv.clone(),
            key: self.key.clone(),
            write_lock: Arc::clone(&self.write_lock),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> LocalRepository<T> {
    pub fn new(kv: KvRepository, namespace: &str) -> Self {
        LocalRepository {
            kv,
            key: T::KIND.storage_key(namespace),
            write_lock: Arc::new(Mutex::new(())),
            _entity: PhantomData,
        }
    }

    /// The storage key this repository reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    async fn load(&self) -> StoreResult<Vec<T>> {
        match self.kv.get(&self.key).await? {
            Some(text) => decode_collection(&self.key, &text, Utc::now()),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, items: &[T]) -> StoreResult<()> {
        let text = encode_collection(&self.key, items)?;
        self.kv.set(&self.key, &text).await
    }

    fn missing(&self, id: &str) -> RepoError {
        RepoError::not_found(T::KIND.collection_name(), id)
    }
}

/// Inserts `item`, replacing an existing entry with the same id.
fn upsert<T: Entity>(items: &mut Vec<T>, item: &T) {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(slot) => *slot = item.clone(),
        None => items.push(item.clone()),
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for LocalRepository<T> {
    async fn get_all(&self) -> RepoResult<Vec<T>> {
        Ok(self.load().await?)
    }

    async fn get_by_id(&self, id: &str) -> RepoResult<Option<T>> {
        Ok(self.load().await?.into_iter().find(|item| item.id() == id))
    }

    async fn create(&self, item: &T) -> RepoResult<T> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        upsert(&mut items, item);
        self.save(&items).await?;
        debug!(key = %self.key, id = %item.id(), "Created");
        Ok(item.clone())
    }

    async fn update(&self, id: &str, item: &T) -> RepoResult<T> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let slot = items
            .iter_mut()
            .find(|existing| existing.id() == id)
            .ok_or_else(|| self.missing(id))?;
        *slot = item.clone();
        self.save(&items).await?;
        debug!(key = %self.key, id = %id, "Updated");
        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let before = items.len();
        items.retain(|existing| existing.id() != id);
        if items.len() != before {
            self.save(&items).await?;
            debug!(key = %self.key, id = %id, "Deleted");
        }
        Ok(())
    }

    async fn clear(&self) -> RepoResult<()> {
        let _guard = self.write_lock.lock().await;
        self.kv.remove(&self.key).await?;
        debug!(key = %self.key, "Cleared");
        Ok(())
    }

    async fn batch_create(&self, batch: &[T]) -> RepoResult<Vec<T>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        for item in batch {
            upsert(&mut items, item);
        }
        self.save(&items).await?;
        debug!(key = %self.key, count = batch.len(), "Batch created");
        Ok(batch.to_vec())
    }

    async fn batch_update(&self, batch: &[T]) -> RepoResult<Vec<T>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        for item in batch {
            let slot = items
                .iter_mut()
                .find(|existing| existing.id() == item.id())
                .ok_or_else(|| self.missing(item.id()))?;
            *slot = item.clone();
        }
        self.save(&items).await?;
        debug!(key = %self.key, count = batch.len(), "Batch updated");
        Ok(batch.to_vec())
    }

    async fn batch_delete(&self, ids: &[String]) -> RepoResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let before = items.len();
        items.retain(|existing| !ids.iter().any(|id| id == existing.id()));
        if items.len() != before {
            self.save(&items).await?;
        }
        debug!(key = %self.key, count = before - items.len(), "Batch deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, StoreConfig};
    use gym_core::factory::new_exercise_type;
    use gym_core::ExerciseType;

    async fn repo() -> LocalRepository<ExerciseType> {
        let db = Database::new(StoreConfig::in_memory()).await.unwrap();
        db.collection::<ExerciseType>("test")
    }

    #[tokio::test]
    async fn test_key_follows_namespace_convention() {
        assert_eq!(repo().await.key(), "test:exercise-types");
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let repo = repo().await;
        let bench = new_exercise_type("Bench");

        assert!(repo.get_all().await.unwrap().is_empty());

        repo.create(&bench).await.unwrap();
        assert_eq!(repo.get_by_id(&bench.id).await.unwrap(), Some(bench.clone()));

        let mut heavy = bench.clone();
        heavy.name = "Bench Heavy".into();
        repo.update(&bench.id, &heavy).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap(), vec![heavy]);

        repo.delete(&bench.id).await.unwrap();
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = repo().await;
        let ghost = new_exercise_type("Ghost");
        let err = repo.update(&ghost.id, &ghost).await.unwrap_err();
        assert_eq!(err, RepoError::not_found("exercise-types", ghost.id));
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let repo = repo().await;
        repo.delete("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_existing_id_replaces() {
        let repo = repo().await;
        let a = new_exercise_type("A");
        repo.create(&a).await.unwrap();
        let mut renamed = a.clone();
        renamed.name = "A2".into();
        repo.create(&renamed).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap(), vec![renamed]);
    }

    #[tokio::test]
    async fn test_failed_batch_update_writes_nothing() {
        let repo = repo().await;
        let a = new_exercise_type("A");
        repo.create(&a).await.unwrap();

        let mut renamed = a.clone();
        renamed.name = "A2".into();
        let ghost = new_exercise_type("Ghost");
        assert!(repo.batch_update(&[renamed, ghost]).await.is_err());
        assert_eq!(repo.get_all().await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn test_batches_and_clear() {
        let repo = repo().await;
        let items = vec![new_exercise_type("A"), new_exercise_type("B"), new_exercise_type("C")];
        repo.batch_create(&items).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), 3);

        repo.batch_delete(&[items[0].id.clone(), items[2].id.clone()])
            .await
            .unwrap();
        assert_eq!(repo.get_all().await.unwrap(), vec![items[1].clone()]);

        repo.clear().await.unwrap();
        assert!(repo.get_all().await.unwrap().is_empty());
    }
}
