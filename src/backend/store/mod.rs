//! Document Store Module
//!
//! Persistence for users, boards, columns and tasks, treated as a generic
//! document store addressed by id. Parent/child relations (board → columns,
//! column → tasks) are answered by queries on each child's own parent id,
//! sorted by position, so no parent keeps a second copy of its child list.
//!
//! # Architecture
//!
//! - **`memory`** - In-process store used for development and tests
//! - **`postgres`** - `documents` table in PostgreSQL (JSONB bodies)
//! - **`timed`** - Decorator bounding every call with a timeout
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs      - DocumentStore trait, Document trait, StoreError
//! ├── memory.rs   - MemoryStore
//! ├── postgres.rs - PgStore
//! └── timed.rs    - TimedStore
//! ```
//!
//! # Atomicity
//!
//! Batch writes (`write_columns`, `write_tasks`) apply all upserts and
//! removals as one unit. Removing a board removes its columns and their
//! tasks; removing a column removes its tasks.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::shared::{Board, Column, Task};

/// In-memory document store
pub mod memory;

/// PostgreSQL document store
pub mod postgres;

/// Timeout decorator
pub mod timed;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use timed::TimedStore;

/// Failures of the durable store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The call did not finish within the configured bound
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or query failure in the backing database
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored document could not be decoded
    #[error("stored document is corrupt: {0}")]
    Corrupt(String),

    /// The write would break a uniqueness constraint, such as a second
    /// user with the same email
    #[error("duplicate document: {0}")]
    Duplicate(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Duplicate(db.constraint().unwrap_or("unique").to_string())
            }
            _ => Self::Unavailable(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A persisted document kind
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Discriminator stored next to the document
    const KIND: &'static str;

    fn id(&self) -> Uuid;

    /// Owning document, for kinds that have one
    fn parent_id(&self) -> Option<Uuid> {
        None
    }

    /// Position among siblings, for ordered kinds
    fn position(&self) -> Option<i32> {
        None
    }
}

impl Document for User {
    const KIND: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Board {
    const KIND: &'static str = "board";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Column {
    const KIND: &'static str = "column";

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.board_id)
    }

    fn position(&self) -> Option<i32> {
        Some(self.position)
    }
}

impl Document for Task {
    const KIND: &'static str = "task";

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.column_id)
    }

    fn position(&self) -> Option<i32> {
        Some(self.position)
    }
}

/// Durable storage for every persisted entity
///
/// Child queries return documents sorted by position.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn put_user(&self, user: &User) -> StoreResult<()>;

    async fn get_board(&self, id: Uuid) -> StoreResult<Option<Board>>;
    /// Boards where the user is creator or member
    async fn boards_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Board>>;
    async fn put_board(&self, board: &Board) -> StoreResult<()>;
    /// Remove a board together with its columns and their tasks
    async fn delete_board(&self, id: Uuid) -> StoreResult<()>;

    async fn get_column(&self, id: Uuid) -> StoreResult<Option<Column>>;
    async fn columns_for_board(&self, board_id: Uuid) -> StoreResult<Vec<Column>>;
    /// Upsert and remove columns as one unit; removed columns take their tasks
    async fn write_columns(&self, upserts: &[Column], removals: &[Uuid]) -> StoreResult<()>;

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>>;
    async fn tasks_for_column(&self, column_id: Uuid) -> StoreResult<Vec<Task>>;
    /// Upsert and remove tasks as one unit
    async fn write_tasks(&self, upserts: &[Task], removals: &[Uuid]) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::fmt;

    #[derive(Debug)]
    struct PgFailure {
        unique: bool,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for PgFailure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message())
        }
    }

    impl std::error::Error for PgFailure {}

    impl DatabaseError for PgFailure {
        fn message(&self) -> &str {
            "database error"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    fn database(unique: bool, constraint: Option<&'static str>) -> sqlx::Error {
        sqlx::Error::Database(Box::new(PgFailure { unique, constraint }))
    }

    #[test]
    fn test_unique_violation_is_duplicate() {
        let err = StoreError::from(database(true, Some("idx_documents_user_email")));
        assert_eq!(err, StoreError::Duplicate("idx_documents_user_email".to_string()));
    }

    #[test]
    fn test_other_database_errors_are_unavailable() {
        match StoreError::from(database(false, None)) {
            StoreError::Unavailable(_) => {}
            other => panic!("Expected Unavailable, got {:?}", other),
        }
        match StoreError::from(sqlx::Error::PoolTimedOut) {
            StoreError::Unavailable(_) => {}
            other => panic!("Expected Unavailable, got {:?}", other),
        }
    }
}
