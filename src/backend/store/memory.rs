/**
 * In-Memory Document Store
 *
 * Keeps every collection behind a single `RwLock` so that batch writes are
 * applied atomically with respect to readers. Used when `DATABASE_URL` is
 * not configured, and by the test suite.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::backend::store::{DocumentStore, StoreError, StoreResult};
use crate::shared::{Board, Column, Task};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    boards: HashMap<Uuid, Board>,
    columns: HashMap<Uuid, Column>,
    tasks: HashMap<Uuid, Task>,
}

impl Collections {
    fn remove_column_cascade(&mut self, column_id: Uuid) {
        self.columns.remove(&column_id);
        self.tasks.retain(|_, task| task.column_id != column_id);
    }
}

/// Document store held entirely in process memory
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.collections.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let collections = self.collections.read().await;
        Ok(collections
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn put_user(&self, user: &User) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        if collections
            .users
            .values()
            .any(|other| other.email == user.email && other.id != user.id)
        {
            return Err(StoreError::Duplicate("user email".to_string()));
        }
        collections.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_board(&self, id: Uuid) -> StoreResult<Option<Board>> {
        Ok(self.collections.read().await.boards.get(&id).cloned())
    }

    async fn boards_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Board>> {
        let collections = self.collections.read().await;
        let mut boards: Vec<Board> = collections
            .boards
            .values()
            .filter(|board| board.is_member(user_id))
            .cloned()
            .collect();
        boards.sort_by_key(|board| board.created_at);
        Ok(boards)
    }

    async fn put_board(&self, board: &Board) -> StoreResult<()> {
        self.collections
            .write()
            .await
            .boards
            .insert(board.id, board.clone());
        Ok(())
    }

    async fn delete_board(&self, id: Uuid) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        collections.boards.remove(&id);
        let column_ids: Vec<Uuid> = collections
            .columns
            .values()
            .filter(|column| column.board_id == id)
            .map(|column| column.id)
            .collect();
        for column_id in column_ids {
            collections.remove_column_cascade(column_id);
        }
        Ok(())
    }

    async fn get_column(&self, id: Uuid) -> StoreResult<Option<Column>> {
        Ok(self.collections.read().await.columns.get(&id).cloned())
    }

    async fn columns_for_board(&self, board_id: Uuid) -> StoreResult<Vec<Column>> {
        let collections = self.collections.read().await;
        let mut columns: Vec<Column> = collections
            .columns
            .values()
            .filter(|column| column.board_id == board_id)
            .cloned()
            .collect();
        columns.sort_by_key(|column| column.position);
        Ok(columns)
    }

    async fn write_columns(&self, upserts: &[Column], removals: &[Uuid]) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        for column_id in removals {
            collections.remove_column_cascade(*column_id);
        }
        for column in upserts {
            collections.columns.insert(column.id, column.clone());
        }
        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.collections.read().await.tasks.get(&id).cloned())
    }

    async fn tasks_for_column(&self, column_id: Uuid) -> StoreResult<Vec<Task>> {
        let collections = self.collections.read().await;
        let mut tasks: Vec<Task> = collections
            .tasks
            .values()
            .filter(|task| task.column_id == column_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.position);
        Ok(tasks)
    }

    async fn write_tasks(&self, upserts: &[Task], removals: &[Uuid]) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        for task_id in removals {
            collections.tasks.remove(task_id);
        }
        for task in upserts {
            collections.tasks.insert(task.id, task.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Visibility;

    fn column(board_id: Uuid, position: i32) -> Column {
        let mut column = Column::new(board_id, format!("Column {}", position));
        column.position = position;
        column
    }

    #[tokio::test]
    async fn test_columns_sorted_by_position() {
        let store = MemoryStore::new();
        let board_id = Uuid::new_v4();
        let (a, b, c) = (column(board_id, 3), column(board_id, 1), column(board_id, 2));
        store.write_columns(&[a.clone(), b.clone(), c.clone()], &[]).await.unwrap();

        let ids: Vec<Uuid> = store
            .columns_for_board(board_id)
            .await
            .unwrap()
            .into_iter()
            .map(|column| column.id)
            .collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);
    }

    #[tokio::test]
    async fn test_delete_board_cascades() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let board = Board::new("Board".to_string(), None, Visibility::Workspace, owner);
        store.put_board(&board).await.unwrap();

        let col = column(board.id, 1);
        store.write_columns(&[col.clone()], &[]).await.unwrap();
        let mut task = Task::new(col.id, "Task".to_string(), owner);
        task.position = 1;
        store.write_tasks(&[task.clone()], &[]).await.unwrap();

        store.delete_board(board.id).await.unwrap();

        assert!(store.get_board(board.id).await.unwrap().is_none());
        assert!(store.get_column(col.id).await.unwrap().is_none());
        assert!(store.get_task(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_user_with_same_email_is_duplicate() {
        let store = MemoryStore::new();
        let user = |name: &str| User::new(name.to_string(), name.to_string(), "same@example.com".to_string(), "hash".to_string());
        let mut first = user("ada");
        store.put_user(&first).await.unwrap();

        let err = store.put_user(&user("eve")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        first.name = "Ada L".to_string();
        store.put_user(&first).await.unwrap();
    }

    #[tokio::test]
    async fn test_boards_for_user_includes_creator_and_members() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut board = Board::new("Shared".to_string(), None, Visibility::Workspace, owner);
        board.add_member(member);
        store.put_board(&board).await.unwrap();

        assert_eq!(store.boards_for_user(owner).await.unwrap().len(), 1);
        assert_eq!(store.boards_for_user(member).await.unwrap().len(), 1);
        assert!(store.boards_for_user(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
