/**
 * Realtime Room Router
 *
 * Maps live connections to rooms and fans events out to them.
 *
 * # Rooms
 *
 * Room keys are namespaced by kind so that a board id can never collide with
 * a user id:
 *
 * ```text
 * board:<board id>   every connection viewing that board
 * user:<user id>     every connection of that user (joined on connect)
 * ```
 *
 * # Fan-out
 *
 * `emit` takes a list of rooms and delivers the event once to each distinct
 * connection in their union, optionally skipping the originating
 * connection. Delivery is a non-blocking enqueue; failures are logged.
 */

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::backend::realtime::broadcast::{deliver, DeliveryError, EventReceiver, EventSender};
use crate::backend::realtime::presence::PresenceRegistry;
use crate::shared::{Actor, RealtimeEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomKey {
    Board(Uuid),
    User(Uuid),
}

impl RoomKey {
    pub fn board_id(&self) -> Option<Uuid> {
        match self {
            Self::Board(id) => Some(*id),
            Self::User(_) => None,
        }
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board(id) => write!(f, "board:{}", id),
            Self::User(id) => write!(f, "user:{}", id),
        }
    }
}

/// Identity of one live socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

struct Connection {
    actor: Actor,
    sender: EventSender,
    rooms: HashSet<RoomKey>,
}

#[derive(Default)]
struct RouterState {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<RoomKey, HashSet<ConnectionId>>,
}

impl RouterState {
    fn join(&mut self, connection: ConnectionId, room: RoomKey) -> bool {
        let Some(entry) = self.connections.get_mut(&connection) else {
            return false;
        };
        if !entry.rooms.insert(room) {
            return false;
        }
        self.rooms.entry(room).or_default().insert(connection);
        true
    }

    fn leave(&mut self, connection: ConnectionId, room: RoomKey) -> bool {
        let Some(entry) = self.connections.get_mut(&connection) else {
            return false;
        };
        if !entry.rooms.remove(&room) {
            return false;
        }
        if let Some(members) = self.rooms.get_mut(&room) {
            members.remove(&connection);
            if members.is_empty() {
                self.rooms.remove(&room);
            }
        }
        true
    }
}

/// Connection and room bookkeeping shared by every socket and the coordinator
#[derive(Clone)]
pub struct RoomRouter {
    inner: Arc<RwLock<RouterState>>,
    presence: PresenceRegistry,
    buffer: usize,
}

impl RoomRouter {
    /// `buffer` is the outbound queue capacity of each connection
    pub fn new(presence: PresenceRegistry, buffer: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RouterState::default())),
            presence,
            buffer: buffer.max(1),
        }
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    /// Register a connection and join it to its user's personal room
    pub async fn connect(&self, actor: Actor) -> (ConnectionId, EventReceiver) {
        let connection = ConnectionId::new();
        let (sender, receiver) = mpsc::channel(self.buffer);
        let user_id = actor.user_id;
        {
            let mut state = self.inner.write().await;
            state.connections.insert(
                connection,
                Connection {
                    actor,
                    sender,
                    rooms: HashSet::new(),
                },
            );
            state.join(connection, RoomKey::User(user_id));
        }
        self.presence.add(user_id, connection).await;
        tracing::info!("[Realtime] {} connected for user {}", connection, user_id);
        (connection, receiver)
    }

    /// Remove a connection from every room. Returns its actor and the rooms
    /// it was in, or `None` if it was already gone.
    pub async fn disconnect(&self, connection: ConnectionId) -> Option<(Actor, Vec<RoomKey>)> {
        let removed = {
            let mut state = self.inner.write().await;
            let removed = state.connections.remove(&connection)?;
            for room in &removed.rooms {
                if let Some(members) = state.rooms.get_mut(room) {
                    members.remove(&connection);
                    if members.is_empty() {
                        state.rooms.remove(room);
                    }
                }
            }
            removed
        };
        self.presence.remove(removed.actor.user_id, connection).await;
        tracing::info!("[Realtime] {} disconnected", connection);

        let mut rooms: Vec<RoomKey> = removed.rooms.into_iter().collect();
        rooms.sort();
        Some((removed.actor, rooms))
    }

    /// Returns false if the connection is unknown or already in the room
    pub async fn join(&self, connection: ConnectionId, room: RoomKey) -> bool {
        let joined = self.inner.write().await.join(connection, room);
        if joined {
            tracing::debug!("[Realtime] {} joined {}", connection, room);
        }
        joined
    }

    pub async fn leave(&self, connection: ConnectionId, room: RoomKey) -> bool {
        let left = self.inner.write().await.leave(connection, room);
        if left {
            tracing::debug!("[Realtime] {} left {}", connection, room);
        }
        left
    }

    /// Join every live connection of `user_id` to `room`
    pub async fn join_user(&self, user_id: Uuid, room: RoomKey) -> usize {
        let connections = self.presence.connections_of(user_id).await;
        let mut state = self.inner.write().await;
        connections
            .into_iter()
            .filter(|connection| state.join(*connection, room))
            .count()
    }

    /// Remove every live connection of `user_id` from `room`
    pub async fn leave_user(&self, user_id: Uuid, room: RoomKey) -> usize {
        let connections = self.presence.connections_of(user_id).await;
        let mut state = self.inner.write().await;
        connections
            .into_iter()
            .filter(|connection| state.leave(*connection, room))
            .count()
    }

    /// Drop a room and detach every connection from it
    pub async fn close_room(&self, room: RoomKey) -> usize {
        let mut state = self.inner.write().await;
        let Some(members) = state.rooms.remove(&room) else {
            return 0;
        };
        for connection in &members {
            if let Some(entry) = state.connections.get_mut(connection) {
                entry.rooms.remove(&room);
            }
        }
        tracing::debug!("[Realtime] Closed {} ({} connections)", room, members.len());
        members.len()
    }

    /// Deliver `event` once to every connection in any of `rooms`, except
    /// `exclude`. Returns how many connections accepted it.
    pub async fn emit(
        &self,
        rooms: &[RoomKey],
        event: RealtimeEvent,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let targets: Vec<(ConnectionId, EventSender)> = {
            let state = self.inner.read().await;
            let mut seen = HashSet::new();
            rooms
                .iter()
                .filter_map(|room| state.rooms.get(room))
                .flatten()
                .filter(|connection| Some(**connection) != exclude && seen.insert(**connection))
                .filter_map(|connection| {
                    state
                        .connections
                        .get(connection)
                        .map(|entry| (*connection, entry.sender.clone()))
                })
                .collect()
        };

        let event = Arc::new(event);
        let mut delivered = 0;
        for (connection, sender) in targets {
            match deliver(connection, &sender, event.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::warn!("[Realtime] Dropped {}: {}", event.event.as_str(), err)
                }
            }
        }
        delivered
    }

    /// Deliver `event` to a single connection
    pub async fn send_to(&self, connection: ConnectionId, event: RealtimeEvent) -> Result<(), DeliveryError> {
        let sender = {
            let state = self.inner.read().await;
            state
                .connections
                .get(&connection)
                .map(|entry| entry.sender.clone())
                .ok_or(DeliveryError::UnknownConnection(connection))?
        };
        deliver(connection, &sender, Arc::new(event))
    }

    pub async fn rooms_of(&self, connection: ConnectionId) -> Vec<RoomKey> {
        let state = self.inner.read().await;
        let mut rooms: Vec<RoomKey> = state
            .connections
            .get(&connection)
            .map(|entry| entry.rooms.iter().copied().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    pub async fn is_in_room(&self, connection: ConnectionId, room: RoomKey) -> bool {
        self.inner
            .read()
            .await
            .rooms
            .get(&room)
            .is_some_and(|members| members.contains(&connection))
    }

    pub async fn room_size(&self, room: RoomKey) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(&room)
            .map_or(0, HashSet::len)
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Forget rooms that no connection is in
    pub async fn prune_empty_rooms(&self) -> usize {
        let mut state = self.inner.write().await;
        let before = state.rooms.len();
        state.rooms.retain(|_, members| !members.is_empty());
        before - state.rooms.len()
    }
}
