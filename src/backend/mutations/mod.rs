//! Mutation Coordinator
//!
//! The only path by which persisted state changes, whether the request came
//! over HTTP or over a socket. Every operation runs the same sequence:
//!
//! ```text
//! 1. resolve the acting user          (Unauthorized if unknown)
//! 2. consult the board guard          (Forbidden / NotFound / Validation)
//! 3. write the store, through the ordered collection for positions
//! 4. resolve display metadata for the event
//! 5. emit one event to the affected rooms
//! 6. return the canonical entity
//! ```
//!
//! Nothing is written before step 3. A failure in step 4 leaves the entity
//! mutated but unannounced; that case is logged as an inconsistency and the
//! caller still gets the committed entity.
//!
//! # Module Structure
//!
//! ```text
//! mutations/
//! ├── mod.rs     - MutationCoordinator, Caller, event emission
//! ├── boards.rs  - board, membership and admin operations
//! ├── columns.rs - column operations
//! └── tasks.rs   - task and comment operations
//! ```

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::backend::error::BackendError;
use crate::backend::guard::BoardGuard;
use crate::backend::ordering::{ColumnSource, OrderedCollection, TaskSource};
use crate::backend::realtime::{ConnectionId, RoomKey, RoomRouter};
use crate::backend::store::DocumentStore;
use crate::shared::{Board, Column, EventType, RealtimeEvent, Task};

/// Board, membership and admin operations
pub mod boards;

/// Column operations
pub mod columns;

/// Task and comment operations
pub mod tasks;

/// Who is asking, and over which socket if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    /// Originating socket; excluded from the resulting broadcast
    pub origin: Option<ConnectionId>,
}

impl Caller {
    pub fn rest(user_id: Uuid) -> Self {
        Self {
            user_id,
            origin: None,
        }
    }

    pub fn socket(user_id: Uuid, connection: ConnectionId) -> Self {
        Self {
            user_id,
            origin: Some(connection),
        }
    }
}

#[derive(Clone)]
pub struct MutationCoordinator {
    store: Arc<dyn DocumentStore>,
    guard: BoardGuard,
    ordering: OrderedCollection,
    rooms: RoomRouter,
}

impl MutationCoordinator {
    pub fn new(store: Arc<dyn DocumentStore>, ordering: OrderedCollection, rooms: RoomRouter) -> Self {
        Self {
            guard: BoardGuard::new(store.clone()),
            store,
            ordering,
            rooms,
        }
    }

    pub fn guard(&self) -> &BoardGuard {
        &self.guard
    }

    pub fn rooms(&self) -> &RoomRouter {
        &self.rooms
    }

    pub fn ordering(&self) -> &OrderedCollection {
        &self.ordering
    }

    fn columns(&self) -> ColumnSource {
        ColumnSource(self.store.clone())
    }

    fn tasks(&self) -> TaskSource {
        TaskSource(self.store.clone())
    }

    async fn resolve_actor(&self, caller: &Caller) -> Result<User, BackendError> {
        self.store
            .get_user(caller.user_id)
            .await?
            .ok_or_else(|| BackendError::unauthorized("user no longer exists"))
    }

    async fn find_column(&self, column_id: Uuid) -> Result<Column, BackendError> {
        self.store
            .get_column(column_id)
            .await?
            .ok_or_else(|| BackendError::not_found("Column", column_id))
    }

    async fn find_task(&self, task_id: Uuid) -> Result<Task, BackendError> {
        self.store
            .get_task(task_id)
            .await?
            .ok_or_else(|| BackendError::not_found("Task", task_id))
    }

    async fn require_users(&self, ids: &[Uuid]) -> Result<(), BackendError> {
        for id in ids {
            if self.store.get_user(*id).await?.is_none() {
                return Err(BackendError::not_found("User", id));
            }
        }
        Ok(())
    }

    /// Emit one event after a committed write.
    ///
    /// Resolves the actor's display name first. If that fails the write
    /// stays committed and the event is skipped.
    async fn announce(&self, caller: &Caller, rooms: &[RoomKey], event: EventType, payload: Value) {
        let actor = match self.store.get_user(caller.user_id).await {
            Ok(Some(user)) => user.actor(),
            Ok(None) => {
                tracing::error!(
                    "[Mutation] inconsistency: {} committed but actor {} no longer resolves; event not sent",
                    event.as_str(),
                    caller.user_id
                );
                return;
            }
            Err(err) => {
                tracing::error!(
                    "[Mutation] inconsistency: {} committed but actor lookup failed ({}); event not sent",
                    event.as_str(),
                    err
                );
                return;
            }
        };

        let delivered = self
            .rooms
            .emit(rooms, RealtimeEvent::new(event, payload).by(&actor), caller.origin)
            .await;
        tracing::debug!(
            "[Mutation] {} by {} delivered to {} connections",
            event.as_str(),
            actor.user_name,
            delivered
        );
    }
}

/// Personal rooms of every participant of a board
fn participant_rooms(board: &Board) -> Vec<RoomKey> {
    board.participants().into_iter().map(RoomKey::User).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backend::ordering::ParentScopes;
    use crate::backend::realtime::PresenceRegistry;
    use crate::backend::store::MemoryStore;

    pub(crate) struct Fixture {
        pub coordinator: MutationCoordinator,
        pub store: Arc<dyn DocumentStore>,
        pub ada: Uuid,
        pub bob: Uuid,
    }

    pub(crate) async fn fixture() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for name in ["ada", "bob"] {
            let user = User::new(
                name.to_string(),
                name.to_string(),
                format!("{}@example.com", name),
                "hash".to_string(),
            );
            store.put_user(&user).await.unwrap();
            ids.push(user.id);
        }
        let rooms = RoomRouter::new(PresenceRegistry::new(), 16);
        let coordinator = MutationCoordinator::new(
            store.clone(),
            OrderedCollection::new(ParentScopes::new(), 3),
            rooms,
        );
        Fixture {
            coordinator,
            store,
            ada: ids[0],
            bob: ids[1],
        }
    }

    #[tokio::test]
    async fn test_unknown_caller_is_unauthorized() {
        let Fixture { coordinator, .. } = fixture().await;
        let err = coordinator
            .list_boards(&Caller::rest(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized { .. }));
    }

    #[test]
    fn test_socket_caller_carries_origin() {
        let connection = ConnectionId::new();
        let caller = Caller::socket(Uuid::new_v4(), connection);
        assert_eq!(caller.origin, Some(connection));
        assert_eq!(Caller::rest(caller.user_id).origin, None);
    }
}
