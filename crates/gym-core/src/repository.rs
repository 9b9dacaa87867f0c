//! # Repository Contract
//!
//! The asynchronous CRUD primitive every storage backend implements. A
//! repository knows nothing about diffs, snapshots or batching policy; the
//! sync layer decides what to call and in which order.
//!
//! ```text
//!                      ┌──────────────────────┐
//!   SyncQueue ───────► │  dyn Repository<T>   │
//!                      └──────────┬───────────┘
//!                ┌────────────────┼─────────────────┐
//!                ▼                ▼                 ▼
//!        LocalRepository   RemoteRepository   MemoryRepository
//!        (gym-store)       (gym-sync, REST)   (gym-sync, tests)
//! ```
//!
//! Every failure is returned as a [`RepoError`]; implementations must not
//! panic or leak backend-specific error types.

use async_trait::async_trait;

use crate::entity::Entity;
use crate::error::RepoResult;

/// Asynchronous storage for one collection of `T`.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Returns every item visible to the caller.
    async fn get_all(&self) -> RepoResult<Vec<T>>;

    /// Returns the item with `id`, or `None` if it does not exist.
    async fn get_by_id(&self, id: &str) -> RepoResult<Option<T>>;

    /// Persists a new item and returns the stored form.
    async fn create(&self, item: &T) -> RepoResult<T>;

    /// Replaces the item with `id` and returns the stored form.
    ///
    /// Fails with [`RepoError::NotFound`](crate::RepoError::NotFound) if no
    /// such item exists.
    async fn update(&self, id: &str, item: &T) -> RepoResult<T>;

    /// Removes the item with `id`. Removing a missing item is not an error.
    async fn delete(&self, id: &str) -> RepoResult<()>;

    /// Removes every item visible to the caller.
    async fn clear(&self) -> RepoResult<()>;

    // =========================================================================
    // Batch Operations
    // =========================================================================
    //
    // Defaults issue one call per item and stop at the first failure.
    // Backends that can do better override them.

    async fn batch_create(&self, items: &[T]) -> RepoResult<Vec<T>> {
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            created.push(self.create(item).await?);
        }
        Ok(created)
    }

    async fn batch_update(&self, items: &[T]) -> RepoResult<Vec<T>> {
        let mut updated = Vec::with_capacity(items.len());
        for item in items {
            updated.push(self.update(item.id(), item).await?);
        }
        Ok(updated)
    }

    async fn batch_delete(&self, ids: &[String]) -> RepoResult<()> {
        for id in ids {
            self.delete(id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use crate::types::Program;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Minimal repository relying on every default batch method.
    #[derive(Default)]
    struct VecRepository {
        items: Mutex<Vec<Program>>,
    }

    #[async_trait]
    impl Repository<Program> for VecRepository {
        async fn get_all(&self) -> RepoResult<Vec<Program>> {
            Ok(self.items.lock().unwrap().clone())
        }

        async fn get_by_id(&self, id: &str) -> RepoResult<Option<Program>> {
            Ok(self.items.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn create(&self, item: &Program) -> RepoResult<Program> {
            self.items.lock().unwrap().push(item.clone());
            Ok(item.clone())
        }

        async fn update(&self, id: &str, item: &Program) -> RepoResult<Program> {
            let mut items = self.items.lock().unwrap();
            let slot = items
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| RepoError::not_found("programs", id))?;
            *slot = item.clone();
            Ok(item.clone())
        }

        async fn delete(&self, id: &str) -> RepoResult<()> {
            self.items.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }

        async fn clear(&self) -> RepoResult<()> {
            self.items.lock().unwrap().clear();
            Ok(())
        }
    }

    fn program(id: &str) -> Program {
        let now = Utc::now();
        Program {
            id: id.into(),
            name: format!("Program {id}"),
            routine_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_default_batches_loop_over_single_operations() {
        let repo = VecRepository::default();
        repo.batch_create(&[program("a"), program("b")]).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), 2);

        repo.batch_delete(&["a".to_string()]).await.unwrap();
        assert!(repo.get_by_id("a").await.unwrap().is_none());
        assert!(repo.get_by_id("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_default_batch_update_stops_at_missing_item() {
        let repo = VecRepository::default();
        let err = repo.batch_update(&[program("ghost")]).await.unwrap_err();
        assert_eq!(err, RepoError::not_found("programs", "ghost"));
    }
}
