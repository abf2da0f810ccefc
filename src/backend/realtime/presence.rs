//! Presence registry
//!
//! Process-wide record of which users are reachable, as user id → live
//! connection ids. Rebuilt from scratch as sockets connect; never persisted.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::realtime::rooms::ConnectionId;

#[derive(Clone, Default)]
pub struct PresenceRegistry {
    users: Arc<RwLock<HashMap<Uuid, HashSet<ConnectionId>>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection. Returns true if the user just came online.
    pub async fn add(&self, user_id: Uuid, connection: ConnectionId) -> bool {
        let mut users = self.users.write().await;
        let connections = users.entry(user_id).or_default();
        connections.insert(connection);
        connections.len() == 1
    }

    /// Forget a connection. Returns true if the user has no connection left.
    pub async fn remove(&self, user_id: Uuid, connection: ConnectionId) -> bool {
        let mut users = self.users.write().await;
        let Some(connections) = users.get_mut(&user_id) else {
            return false;
        };
        connections.remove(&connection);
        if connections.is_empty() {
            users.remove(&user_id);
            true
        } else {
            false
        }
    }

    pub async fn connections_of(&self, user_id: Uuid) -> Vec<ConnectionId> {
        self.users
            .read()
            .await
            .get(&user_id)
            .map(|connections| connections.iter().copied().collect())
            .unwrap_or_default()
    }

    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.users.read().await.contains_key(&user_id)
    }

    pub async fn online_users(&self) -> Vec<Uuid> {
        self.users.read().await.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_online_until_last_connection_leaves() {
        let presence = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let (first, second) = (ConnectionId::new(), ConnectionId::new());

        assert!(presence.add(user, first).await);
        assert!(!presence.add(user, second).await);
        assert_eq!(presence.connections_of(user).await.len(), 2);

        assert!(!presence.remove(user, first).await);
        assert!(presence.is_online(user).await);
        assert!(presence.remove(user, second).await);
        assert!(!presence.is_online(user).await);
        assert!(presence.online_users().await.is_empty());
    }

    #[tokio::test]
    async fn test_removing_unknown_user_is_noop() {
        let presence = PresenceRegistry::new();
        assert!(!presence.remove(Uuid::new_v4(), ConnectionId::new()).await);
    }
}
