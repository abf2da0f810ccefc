/**
 * Mutation Request Payloads
 *
 * Request bodies accepted by the REST API. The same payloads are embedded in
 * the realtime protocol so that a mutation sent over the socket carries
 * exactly the fields the HTTP route would.
 *
 * Each payload validates its own shape (non-empty titles, sane positions);
 * referential checks happen in the backend.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::shared::board::Visibility;
use crate::shared::error::SharedError;

fn require_text(field: &str, value: &str) -> Result<(), SharedError> {
    if value.trim().is_empty() {
        return Err(SharedError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn require_position(position: i32) -> Result<(), SharedError> {
    if position < 1 {
        return Err(SharedError::validation(
            "position",
            format!("positions start at 1, got {}", position),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub visibility: Visibility,
    /// Initial members (workspace boards only)
    #[serde(default)]
    pub members: Vec<Uuid>,
}

impl CreateBoardRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_text("title", &self.title)?;
        if self.visibility == Visibility::Private && !self.members.is_empty() {
            return Err(SharedError::validation(
                "members",
                "private boards cannot be created with members",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateBoardRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        Ok(())
    }
}

/// Target of a membership or admin change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumnRequest {
    pub board_id: Uuid,
    pub title: String,
}

impl CreateColumnRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_text("title", &self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumnRequest {
    pub title: String,
}

impl UpdateColumnRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_text("title", &self.title)
    }
}

/// Move within the current parent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub position: i32,
}

impl MoveRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_position(self.position)
    }
}

/// Full column order for a board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReorderColumnsRequest {
    pub column_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub column_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to the caller
    #[serde(default)]
    pub assignee: Option<Uuid>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_text("title", &self.title)
    }
}

/// Partial task update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Reorder within a column, or move to another column when `column_id`
/// names a different one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    #[serde(default)]
    pub column_id: Option<Uuid>,
    pub position: i32,
}

impl MoveTaskRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_position(self.position)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub content: String,
}

impl AddCommentRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_text("content", &self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_rejected() {
        let request = CreateColumnRequest {
            board_id: Uuid::new_v4(),
            title: "   ".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_private_board_with_members_rejected() {
        let request = CreateBoardRequest {
            title: "Secret".to_string(),
            description: None,
            visibility: Visibility::Private,
            members: vec![Uuid::new_v4()],
        };
        match request.validate() {
            Err(SharedError::ValidationError { field, .. }) => assert_eq!(field, "members"),
            other => panic!("Expected members validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_position_rejected() {
        assert!(MoveRequest { position: 0 }.validate().is_err());
        assert!(MoveRequest { position: -3 }.validate().is_err());
        assert!(MoveRequest { position: 1 }.validate().is_ok());
    }

    #[test]
    fn test_fractional_position_fails_to_parse() {
        let parsed: Result<MoveRequest, _> = serde_json::from_str(r#"{"position": 1.5}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_update_task_request_skips_absent_fields() {
        let request = UpdateTaskRequest {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Renamed"}));
        assert!(!request.is_empty());
        assert!(UpdateTaskRequest::default().is_empty());
    }
}
