/**
 * Real-time Event System
 *
 * This module defines the events pushed to connected clients. Every event
 * names what happened (`event`), carries a JSON payload with the affected
 * entity ids and the semantic delta, identifies the acting user when there
 * is one, and is stamped with the server time.
 *
 * Event names serialize in camelCase (`taskMoved`, `userOnline`, ...), which
 * is also the name clients see on the wire.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of real-time event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    // Presence
    UserOnline,
    UserOffline,
    UserActive,
    UserLeft,
    BoardsJoined,

    // Boards and membership
    BoardCreated,
    BoardUpdated,
    BoardDeleted,
    MemberAdded,
    MemberRemoved,
    AddedToBoard,
    RemovedFromBoard,
    AdminAdded,
    AdminRemoved,

    // Columns
    ColumnCreated,
    ColumnUpdated,
    ColumnMoved,
    ColumnsReordered,
    ColumnDeleted,

    // Tasks
    TaskCreated,
    TaskUpdated,
    TaskMoved,
    TaskReordered,
    TaskDeleted,

    // Comments and collaboration signals
    CommentAdded,
    UserIsTyping,
    UserStoppedTyping,
    UserCursorMoved,
    DragPreview,

    // Replies to the socket that sent a request
    Ack,
    Error,
}

impl EventType {
    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserOnline => "userOnline",
            Self::UserOffline => "userOffline",
            Self::UserActive => "userActive",
            Self::UserLeft => "userLeft",
            Self::BoardsJoined => "boardsJoined",
            Self::BoardCreated => "boardCreated",
            Self::BoardUpdated => "boardUpdated",
            Self::BoardDeleted => "boardDeleted",
            Self::MemberAdded => "memberAdded",
            Self::MemberRemoved => "memberRemoved",
            Self::AddedToBoard => "addedToBoard",
            Self::RemovedFromBoard => "removedFromBoard",
            Self::AdminAdded => "adminAdded",
            Self::AdminRemoved => "adminRemoved",
            Self::ColumnCreated => "columnCreated",
            Self::ColumnUpdated => "columnUpdated",
            Self::ColumnMoved => "columnMoved",
            Self::ColumnsReordered => "columnsReordered",
            Self::ColumnDeleted => "columnDeleted",
            Self::TaskCreated => "taskCreated",
            Self::TaskUpdated => "taskUpdated",
            Self::TaskMoved => "taskMoved",
            Self::TaskReordered => "taskReordered",
            Self::TaskDeleted => "taskDeleted",
            Self::CommentAdded => "commentAdded",
            Self::UserIsTyping => "userIsTyping",
            Self::UserStoppedTyping => "userStoppedTyping",
            Self::UserCursorMoved => "userCursorMoved",
            Self::DragPreview => "dragPreview",
            Self::Ack => "ack",
            Self::Error => "error",
        }
    }
}

/// The user responsible for an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: Uuid,
    pub user_name: String,
}

impl Actor {
    pub fn new(user_id: Uuid, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
        }
    }
}

/// Real-time event delivered to room members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeEvent {
    /// Type of event
    pub event: EventType,
    /// Event payload (JSON-serializable data)
    pub payload: serde_json::Value,
    /// Acting user, absent for server-originated events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Actor>,
    /// Timestamp when event occurred
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(event: EventType, payload: serde_json::Value) -> Self {
        Self {
            event,
            payload,
            actor: None,
            timestamp: get_timestamp(),
        }
    }

    /// Attribute the event to a user
    pub fn by(mut self, actor: &Actor) -> Self {
        self.actor = Some(actor.clone());
        self
    }

    /// Presence event about `actor`, optionally scoped to one board
    pub fn presence(event: EventType, actor: &Actor, board_id: Option<Uuid>) -> Self {
        let mut payload = serde_json::json!({
            "userId": actor.user_id,
            "userName": actor.user_name,
        });
        if let Some(board_id) = board_id {
            payload["boardId"] = serde_json::json!(board_id);
        }
        Self::new(event, payload).by(actor)
    }

    /// Error reply for a socket request
    pub fn error(request: &str, category: &str, message: impl Into<String>) -> Self {
        Self::new(
            EventType::Error,
            serde_json::json!({
                "request": request,
                "category": category,
                "message": message.into(),
            }),
        )
    }

    /// Success reply for a socket request
    pub fn ack(request: &str, result: serde_json::Value) -> Self {
        Self::new(
            EventType::Ack,
            serde_json::json!({
                "request": request,
                "result": result,
            }),
        )
    }
}

/// Get the current timestamp as an RFC3339 string
fn get_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
