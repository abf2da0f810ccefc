//! Socket frames sent by clients
//!
//! Every frame is `{"event": <name>, "data": {...}}`. Room control and
//! ephemeral collaboration signals are handled by the router; persisted
//! mutations reuse the REST request payloads and go through the coordinator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::shared::requests::{
    AddCommentRequest, CreateColumnRequest, CreateTaskRequest, MoveTaskRequest, UpdateColumnRequest,
    UpdateTaskRequest,
};
use crate::shared::{EventType, SharedError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoardRef {
    pub board_id: Uuid,
}

/// Ephemeral signal relayed to the rest of a board room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Relay {
    pub board_id: Uuid,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnEdit {
    pub column_id: Uuid,
    #[serde(flatten)]
    pub update: UpdateColumnRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnShift {
    pub column_id: Uuid,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskEdit {
    pub task_id: Uuid,
    #[serde(flatten)]
    pub update: UpdateTaskRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskShift {
    pub task_id: Uuid,
    #[serde(flatten)]
    pub target: MoveTaskRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub task_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentSubmit {
    pub task_id: Uuid,
    #[serde(flatten)]
    pub comment: AddCommentRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinBoard(BoardRef),
    LeaveBoard(BoardRef),

    CursorMove(Relay),
    UserTyping(Relay),
    UserStoppedTyping(Relay),
    DragPreview(Relay),

    ColumnCreate(CreateColumnRequest),
    ColumnUpdate(ColumnEdit),
    ColumnMove(ColumnShift),
    TaskCreate(CreateTaskRequest),
    TaskUpdate(TaskEdit),
    TaskMove(TaskShift),
    TaskDelete(TaskRef),
    AddComment(CommentSubmit),
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Wire name of the request, echoed in ack and error replies
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinBoard(_) => "joinBoard",
            Self::LeaveBoard(_) => "leaveBoard",
            Self::CursorMove(_) => "cursorMove",
            Self::UserTyping(_) => "userTyping",
            Self::UserStoppedTyping(_) => "userStoppedTyping",
            Self::DragPreview(_) => "dragPreview",
            Self::ColumnCreate(_) => "columnCreate",
            Self::ColumnUpdate(_) => "columnUpdate",
            Self::ColumnMove(_) => "columnMove",
            Self::TaskCreate(_) => "taskCreate",
            Self::TaskUpdate(_) => "taskUpdate",
            Self::TaskMove(_) => "taskMove",
            Self::TaskDelete(_) => "taskDelete",
            Self::AddComment(_) => "addComment",
        }
    }

    /// Event relayed to peers for ephemeral signals, `None` for the rest
    pub fn relay_event(&self) -> Option<(EventType, &Relay)> {
        match self {
            Self::CursorMove(relay) => Some((EventType::UserCursorMoved, relay)),
            Self::UserTyping(relay) => Some((EventType::UserIsTyping, relay)),
            Self::UserStoppedTyping(relay) => Some((EventType::UserStoppedTyping, relay)),
            Self::DragPreview(relay) => Some((EventType::DragPreview, relay)),
            _ => None,
        }
    }
}
