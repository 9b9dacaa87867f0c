//! Restores a collection's visible state after a failed sync.

use std::sync::Arc;
use tokio::sync::watch;

use gym_core::{Entity, Snapshot};

/// Optimistic collection contents as observed by readers.
pub type VisibleState<T> = Arc<watch::Sender<Arc<Vec<T>>>>;

/// Rewinds the visible collection to the last confirmed snapshot.
///
/// The snapshot itself is only read: it was never advanced by the failed
/// attempt, so the next delta is computed from the true last-good state.
#[derive(Debug)]
pub struct RollbackManager<T> {
    visible: VisibleState<T>,
}

impl<T> Clone for RollbackManager<T> {
    fn clone(&self) -> Self {
        RollbackManager {
            visible: Arc::clone(&self.visible),
        }
    }
}

impl<T: Entity> RollbackManager<T> {
    pub fn new(visible: VisibleState<T>) -> Self {
        RollbackManager { visible }
    }

    pub fn restore(&self, snapshot: &Snapshot<T>) {
        self.visible
            .send_replace(Arc::new(snapshot.items().to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gym_core::factory::new_exercise_type;

    #[test]
    fn test_restore_replaces_visible_state() {
        let bench = new_exercise_type("Bench");
        let mut heavy = bench.clone();
        heavy.name = "Bench Heavy".into();

        let (tx, rx) = watch::channel(Arc::new(vec![heavy]));
        let rollback = RollbackManager::new(Arc::new(tx));

        let snapshot = Snapshot::from_items(vec![bench.clone()]);
        rollback.restore(&snapshot);

        assert_eq!(**rx.borrow(), vec![bench]);
        assert_eq!(snapshot.len(), 1);
    }
}
