//! Per-parent mutual exclusion
//!
//! Position changes under one parent run while holding that parent's scope.
//! Board roster edits hold the board's scope as well.
//!
//! Lock order: a board scope is always taken before any column scope, and
//! several column scopes are taken in ascending id order.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

pub type ScopeGuard = OwnedMutexGuard<()>;

/// Lazily created lock per parent id
#[derive(Clone, Default)]
pub struct ParentScopes {
    scopes: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl ParentScopes {
    pub fn new() -> Self {
        Self::default()
    }

    async fn scope(&self, parent_id: Uuid) -> Arc<Mutex<()>> {
        self.scopes
            .lock()
            .await
            .entry(parent_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Hold the scope of one parent
    pub async fn lock(&self, parent_id: Uuid) -> ScopeGuard {
        self.scope(parent_id).await.lock_owned().await
    }

    /// Hold the scopes of two parents, lowest id first
    pub async fn lock_pair(&self, a: Uuid, b: Uuid) -> Vec<ScopeGuard> {
        self.lock_all(&[a, b]).await
    }

    /// Hold every scope in `ids`, lowest id first, each once
    pub async fn lock_all(&self, ids: &[Uuid]) -> Vec<ScopeGuard> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.lock(id).await);
        }
        guards
    }

    /// Drop scopes nobody holds or waits on. Returns how many were dropped.
    pub async fn prune(&self) -> usize {
        let mut scopes = self.scopes.lock().await;
        let before = scopes.len();
        scopes.retain(|_, scope| Arc::strong_count(scope) > 1);
        before - scopes.len()
    }

    pub async fn len(&self) -> usize {
        self.scopes.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_parent_is_exclusive() {
        let scopes = ParentScopes::new();
        let parent = Uuid::new_v4();
        let _held = scopes.lock(parent).await;

        let waiting = tokio::time::timeout(Duration::from_millis(30), scopes.lock(parent)).await;
        assert!(waiting.is_err());
    }

    #[tokio::test]
    async fn test_different_parents_do_not_block() {
        let scopes = ParentScopes::new();
        let _a = scopes.lock(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(30), scopes.lock(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_lock_pair_with_same_id_takes_one_scope() {
        let scopes = ParentScopes::new();
        let parent = Uuid::new_v4();
        let guards = scopes.lock_pair(parent, parent).await;
        assert_eq!(guards.len(), 1);
    }

    #[tokio::test]
    async fn test_lock_all_dedups_and_holds_every_scope() {
        let scopes = ParentScopes::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let guards = scopes.lock_all(&[b, a, b]).await;
        assert_eq!(guards.len(), 2);

        let waiting = tokio::time::timeout(Duration::from_millis(30), scopes.lock(a)).await;
        assert!(waiting.is_err());
        drop(guards);
        let free = tokio::time::timeout(Duration::from_millis(30), scopes.lock(a)).await;
        assert!(free.is_ok());
    }

    #[tokio::test]
    async fn test_prune_keeps_held_scopes() {
        let scopes = ParentScopes::new();
        let held = scopes.lock(Uuid::new_v4()).await;
        drop(scopes.lock(Uuid::new_v4()).await);

        assert_eq!(scopes.prune().await, 1);
        assert_eq!(scopes.len().await, 1);
        drop(held);
        assert_eq!(scopes.prune().await, 1);
    }
}
