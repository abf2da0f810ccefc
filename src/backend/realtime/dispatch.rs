//! Per-connection frame dispatch
//!
//! One `SocketSession` exists per authenticated socket. Each inbound text
//! frame is parsed into a `ClientMessage` and handled in one of three ways:
//!
//! - room control (`joinBoard`, `leaveBoard`) after a view check
//! - ephemeral relays, forwarded to the rest of the board room
//! - persisted mutations, handed to the coordinator as a socket caller
//!
//! The sender always gets exactly one reply: an `ack` carrying the result or
//! an `error` carrying the category and message. Relays are acknowledged
//! only on failure.

use serde::Serialize;
use serde_json::{json, Value};

use crate::backend::error::BackendError;
use crate::backend::guard::Action;
use crate::backend::mutations::{Caller, MutationCoordinator};
use crate::backend::realtime::protocol::{ClientMessage, Relay};
use crate::backend::realtime::rooms::{ConnectionId, RoomKey};
use crate::shared::{Actor, EventType, RealtimeEvent};

pub struct SocketSession {
    coordinator: MutationCoordinator,
    connection: ConnectionId,
    actor: Actor,
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, BackendError> {
    Ok(serde_json::to_value(value)?)
}

impl SocketSession {
    pub fn new(coordinator: MutationCoordinator, connection: ConnectionId, actor: Actor) -> Self {
        Self {
            coordinator,
            connection,
            actor,
        }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    fn caller(&self) -> Caller {
        Caller::socket(self.actor.user_id, self.connection)
    }

    async fn reply(&self, event: RealtimeEvent) {
        if let Err(err) = self.coordinator.rooms().send_to(self.connection, event).await {
            tracing::warn!("[Socket] Reply to {} dropped: {}", self.connection, err);
        }
    }

    /// Handle one inbound text frame
    pub async fn handle_text(&self, text: &str) {
        let message = match ClientMessage::parse(text) {
            Ok(message) => message,
            Err(err) => {
                let err = BackendError::from(err);
                tracing::debug!("[Socket] Unparseable frame from {}: {}", self.connection, err);
                self.reply(RealtimeEvent::error("unknown", err.category(), err.message()))
                    .await;
                return;
            }
        };

        let name = message.name();
        if let Some((event, relay)) = message.relay_event() {
            if let Err(err) = self.relay(event, relay).await {
                self.reply(RealtimeEvent::error(name, err.category(), err.message()))
                    .await;
            }
            return;
        }

        match self.handle(message).await {
            Ok(result) => self.reply(RealtimeEvent::ack(name, result)).await,
            Err(err) => {
                tracing::debug!("[Socket] {} from {} failed: {}", name, self.actor.user_id, err);
                self.reply(RealtimeEvent::error(name, err.category(), err.message()))
                    .await;
            }
        }
    }

    async fn handle(&self, message: ClientMessage) -> Result<Value, BackendError> {
        let coordinator = &self.coordinator;
        let caller = self.caller();
        match message {
            ClientMessage::JoinBoard(target) => self.join_board(target.board_id).await,
            ClientMessage::LeaveBoard(target) => self.leave_board(target.board_id).await,
            ClientMessage::ColumnCreate(request) => to_value(&coordinator.create_column(&caller, request).await?),
            ClientMessage::ColumnUpdate(edit) => {
                to_value(&coordinator.update_column(&caller, edit.column_id, edit.update).await?)
            }
            ClientMessage::ColumnMove(shift) => {
                to_value(&coordinator.move_column(&caller, shift.column_id, shift.position).await?)
            }
            ClientMessage::TaskCreate(request) => to_value(&coordinator.create_task(&caller, request).await?),
            ClientMessage::TaskUpdate(edit) => {
                to_value(&coordinator.update_task(&caller, edit.task_id, edit.update).await?)
            }
            ClientMessage::TaskMove(shift) => {
                to_value(&coordinator.move_task(&caller, shift.task_id, shift.target).await?)
            }
            ClientMessage::TaskDelete(target) => {
                coordinator.delete_task(&caller, target.task_id).await?;
                Ok(json!({ "taskId": target.task_id }))
            }
            ClientMessage::AddComment(submit) => {
                to_value(&coordinator.add_comment(&caller, submit.task_id, submit.comment).await?)
            }
            ClientMessage::CursorMove(_)
            | ClientMessage::UserTyping(_)
            | ClientMessage::UserStoppedTyping(_)
            | ClientMessage::DragPreview(_) => Ok(Value::Null),
        }
    }

    async fn join_board(&self, board_id: uuid::Uuid) -> Result<Value, BackendError> {
        self.coordinator
            .guard()
            .authorize(board_id, self.actor.user_id, Action::ViewBoard)
            .await?;

        let rooms = self.coordinator.rooms();
        let room = RoomKey::Board(board_id);
        if rooms.join(self.connection, room).await {
            rooms
                .emit(
                    &[room],
                    RealtimeEvent::presence(EventType::UserActive, &self.actor, Some(board_id)),
                    Some(self.connection),
                )
                .await;
        }
        Ok(json!({ "boardId": board_id, "viewers": rooms.room_size(room).await }))
    }

    async fn leave_board(&self, board_id: uuid::Uuid) -> Result<Value, BackendError> {
        let rooms = self.coordinator.rooms();
        let room = RoomKey::Board(board_id);
        if rooms.leave(self.connection, room).await {
            rooms
                .emit(
                    &[room],
                    RealtimeEvent::presence(EventType::UserLeft, &self.actor, Some(board_id)),
                    Some(self.connection),
                )
                .await;
        }
        Ok(json!({ "boardId": board_id }))
    }

    /// Forward an ephemeral signal to the rest of the board room. Only
    /// connections already in the room may relay into it.
    async fn relay(&self, event: EventType, relay: &Relay) -> Result<(), BackendError> {
        let rooms = self.coordinator.rooms();
        let room = RoomKey::Board(relay.board_id);
        if !rooms.is_in_room(self.connection, room).await {
            return Err(BackendError::validation("boardId", "join the board before relaying to it"));
        }

        let mut payload = Value::Object(relay.data.clone());
        payload["boardId"] = json!(relay.board_id);
        payload["userId"] = json!(self.actor.user_id);
        payload["userName"] = json!(self.actor.user_name);
        rooms
            .emit(
                &[room],
                RealtimeEvent::new(event, payload).by(&self.actor),
                Some(self.connection),
            )
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mutations::tests::{fixture, Fixture};
    use crate::backend::realtime::EventReceiver;
    use crate::shared::requests::CreateBoardRequest;
    use crate::shared::{Board, Visibility};

    async fn board(coordinator: &MutationCoordinator, owner: uuid::Uuid) -> Board {
        coordinator
            .create_board(
                &Caller::rest(owner),
                CreateBoardRequest {
                    title: "Launch".to_string(),
                    description: None,
                    visibility: Visibility::Workspace,
                    members: Vec::new(),
                },
            )
            .await
            .unwrap()
    }

    async fn session(coordinator: &MutationCoordinator, user_id: uuid::Uuid, name: &str) -> (SocketSession, EventReceiver) {
        let actor = Actor::new(user_id, name);
        let (connection, rx) = coordinator.rooms().connect(actor.clone()).await;
        (SocketSession::new(coordinator.clone(), connection, actor), rx)
    }

    fn drain(rx: &mut EventReceiver) -> Vec<EventType> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event.event);
        }
        events
    }

    #[tokio::test]
    async fn test_join_board_acks_and_notifies_peers() {
        let Fixture { coordinator, ada, bob, .. } = fixture().await;
        let board = board(&coordinator, ada).await;
        coordinator.add_member(&Caller::rest(ada), board.id, bob).await.unwrap();
        let (ada_session, mut ada_rx) = session(&coordinator, ada, "ada").await;
        let (bob_session, mut bob_rx) = session(&coordinator, bob, "bob").await;

        ada_session
            .handle_text(&json!({"event": "joinBoard", "data": {"boardId": board.id}}).to_string())
            .await;
        drain(&mut ada_rx);
        drain(&mut bob_rx);
        bob_session
            .handle_text(&json!({"event": "joinBoard", "data": {"boardId": board.id}}).to_string())
            .await;

        assert_eq!(drain(&mut ada_rx), vec![EventType::UserActive]);
        let reply = bob_rx.try_recv().unwrap();
        assert_eq!(reply.event, EventType::Ack);
        assert_eq!(reply.payload["result"]["viewers"], 2);
    }

    #[tokio::test]
    async fn test_outsider_cannot_join() {
        let Fixture { coordinator, ada, bob, .. } = fixture().await;
        let board = board(&coordinator, ada).await;
        let (bob_session, mut bob_rx) = session(&coordinator, bob, "bob").await;

        bob_session
            .handle_text(&json!({"event": "joinBoard", "data": {"boardId": board.id}}).to_string())
            .await;

        let reply = bob_rx.try_recv().unwrap();
        assert_eq!(reply.event, EventType::Error);
        assert_eq!(reply.payload["category"], "forbidden");
        assert!(!coordinator.rooms().is_in_room(bob_session.connection(), RoomKey::Board(board.id)).await);
    }

    #[tokio::test]
    async fn test_relay_requires_room_and_skips_sender() {
        let Fixture { coordinator, ada, bob, .. } = fixture().await;
        let board = board(&coordinator, ada).await;
        coordinator.add_member(&Caller::rest(ada), board.id, bob).await.unwrap();
        let (ada_session, mut ada_rx) = session(&coordinator, ada, "ada").await;
        let (bob_session, mut bob_rx) = session(&coordinator, bob, "bob").await;
        let cursor = json!({"event": "cursorMove", "data": {"boardId": board.id, "x": 10, "y": 20}}).to_string();

        ada_session.handle_text(&cursor).await;
        let refused = ada_rx.try_recv().unwrap();
        assert_eq!(refused.event, EventType::Error);

        coordinator.rooms().join(ada_session.connection(), RoomKey::Board(board.id)).await;
        coordinator.rooms().join(bob_session.connection(), RoomKey::Board(board.id)).await;
        drain(&mut bob_rx);
        ada_session.handle_text(&cursor).await;

        let relayed = bob_rx.try_recv().unwrap();
        assert_eq!(relayed.event, EventType::UserCursorMoved);
        assert_eq!(relayed.payload["x"], 10);
        assert_eq!(relayed.payload["userName"], "ada");
        assert!(ada_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_garbage_frame_gets_error_reply() {
        let Fixture { coordinator, ada, .. } = fixture().await;
        let (session, mut rx) = session(&coordinator, ada, "ada").await;

        session.handle_text("not json").await;

        let reply = rx.try_recv().unwrap();
        assert_eq!(reply.event, EventType::Error);
        assert_eq!(reply.payload["request"], "unknown");
    }

    #[tokio::test]
    async fn test_socket_mutation_acks_origin_only() {
        let Fixture { coordinator, ada, .. } = fixture().await;
        let board = board(&coordinator, ada).await;
        let (session, mut rx) = session(&coordinator, ada, "ada").await;
        coordinator.rooms().join(session.connection(), RoomKey::Board(board.id)).await;
        drain(&mut rx);

        session
            .handle_text(
                &json!({"event": "columnCreate", "data": {"boardId": board.id, "title": "Todo"}}).to_string(),
            )
            .await;

        let replies = drain(&mut rx);
        assert_eq!(replies, vec![EventType::Ack]);
    }
}
