/**
 * Task and Comment Data Structures
 *
 * A task lives in one column at a dense 1-based `position`. Comments are
 * embedded in their task and have no lifecycle of their own.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A comment left on a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    /// Author's user ID
    pub author: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            content,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub assignee: Uuid,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a task. The position is assigned when it is appended.
    pub fn new(column_id: Uuid, title: String, assignee: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            column_id,
            title,
            description: None,
            assignee,
            tags: BTreeSet::new(),
            due_date: None,
            comments: Vec::new(),
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task::new(Uuid::new_v4(), "Write docs".to_string(), Uuid::new_v4());
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("columnId").is_some());
        assert!(json.get("dueDate").is_some());
        assert_eq!(json["position"], 0);
    }

    #[test]
    fn test_task_missing_optional_fields_deserialize() {
        let column_id = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "columnId": column_id,
            "title": "Ship",
            "assignee": assignee,
            "position": 2,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
        });
        let task: Task = serde_json::from_value(json).unwrap();
        assert_eq!(task.column_id, column_id);
        assert!(task.tags.is_empty());
        assert!(task.comments.is_empty());
    }
}
