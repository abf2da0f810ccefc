/**
 * WebSocket Endpoint
 *
 * `GET /ws?token=<jwt>` (or `Authorization: Bearer <jwt>`) upgrades to a
 * WebSocket after authenticating once, before the upgrade.
 *
 * # Connection Lifecycle
 *
 * 1. Register the connection (joins the user's personal room)
 * 2. Join one room per board the user created or belongs to
 * 3. Announce `userOnline` to those rooms, tell the client `boardsJoined`
 * 4. Pump frames both ways until either side closes
 * 5. Unregister and announce `userOffline` to the board rooms it was in
 *
 * Outbound events sit in a bounded per-connection queue. A client that
 * stops reading loses events instead of stalling the broadcaster.
 */

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::backend::auth::users::User;
use crate::backend::error::BackendError;
use crate::backend::middleware::{bearer_token, resolve_session};
use crate::backend::realtime::broadcast::EventReceiver;
use crate::backend::realtime::dispatch::SocketSession;
use crate::backend::realtime::rooms::{ConnectionId, RoomKey, RoomRouter};
use crate::backend::server::state::AppState;
use crate::shared::{EventType, RealtimeEvent};

#[derive(Debug, Default, Deserialize)]
pub struct SocketQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// Handle the upgrade request (GET /ws)
///
/// # Errors
///
/// * `401 Unauthorized` - missing, invalid or stale token
pub async fn handle_socket_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<SocketQuery>,
    headers: HeaderMap,
) -> Result<Response, BackendError> {
    let token = query
        .token
        .as_deref()
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| BackendError::unauthorized("missing token"))?;

    let user = resolve_session(state.store.as_ref(), &state.sessions, token).await?;
    tracing::debug!("[Socket] Upgrade accepted for {}", user.id);

    Ok(ws.on_upgrade(move |socket| run_socket(socket, state, user)))
}

/// Register a connection for `user`, join their board rooms and announce it.
///
/// Peers in those rooms get `userOnline`; the new connection gets
/// `boardsJoined` with the ids it was subscribed to.
pub async fn open_session(state: &AppState, user: &User) -> (ConnectionId, EventReceiver) {
    let rooms = &state.rooms;
    let actor = user.actor();
    let (connection, outbound) = rooms.connect(actor.clone()).await;

    let boards = match state.store.boards_for_user(user.id).await {
        Ok(boards) => boards,
        Err(e) => {
            tracing::warn!("[Socket] Could not load boards for {}: {}", user.id, e);
            Vec::new()
        }
    };
    let mut board_rooms = Vec::with_capacity(boards.len());
    for board in &boards {
        let room = RoomKey::Board(board.id);
        rooms.join(connection, room).await;
        board_rooms.push(room);
    }
    rooms
        .emit(
            &board_rooms,
            RealtimeEvent::presence(EventType::UserOnline, &actor, None),
            Some(connection),
        )
        .await;
    let board_ids: Vec<_> = boards.iter().map(|board| board.id).collect();
    if let Err(e) = rooms
        .send_to(
            connection,
            RealtimeEvent::new(EventType::BoardsJoined, json!({ "boardIds": board_ids })),
        )
        .await
    {
        tracing::warn!("[Socket] Could not send boardsJoined to {}: {}", connection, e);
    }
    (connection, outbound)
}

/// Unregister a connection and tell its board rooms the user went offline.
/// The personal room is left silently.
pub async fn close_session(rooms: &RoomRouter, connection: ConnectionId) {
    let Some((actor, left)) = rooms.disconnect(connection).await else {
        return;
    };
    let still_online = rooms.presence().is_online(actor.user_id).await;
    let board_rooms: Vec<RoomKey> = left
        .into_iter()
        .filter(|room| room.board_id().is_some())
        .collect();
    let mut event = RealtimeEvent::presence(EventType::UserOffline, &actor, None);
    event.payload["stillOnline"] = json!(still_online);
    rooms.emit(&board_rooms, event, None).await;
}

async fn run_socket(socket: WebSocket, state: AppState, user: User) {
    let (connection, mut outbound) = open_session(&state, &user).await;
    let session = SocketSession::new(state.coordinator.clone(), connection, user.actor());
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => session.handle_text(text.as_str()).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("[Socket] {} read error: {}", connection, e);
                    break;
                }
            },
            event = outbound.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(event.as_ref()) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!("[Socket] Failed to encode {}: {}", event.event.as_str(), e);
                        continue;
                    }
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    close_session(&state.rooms, connection).await;
}
