//! Timeout decorator for document stores
//!
//! Every call is bounded by the configured store timeout; an expired call
//! surfaces as `StoreError::Timeout` instead of hanging the caller.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::backend::store::{DocumentStore, StoreError, StoreResult};
use crate::shared::{Board, Column, Task};

pub struct TimedStore {
    inner: Arc<dyn DocumentStore>,
    limit: Duration,
}

impl TimedStore {
    pub fn new(inner: Arc<dyn DocumentStore>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(&self, call: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        match tokio::time::timeout(self.limit, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("[Store] Call exceeded {:?}", self.limit);
                Err(StoreError::Timeout(self.limit))
            }
        }
    }
}

#[async_trait]
impl DocumentStore for TimedStore {
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.bounded(self.inner.get_user(id)).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.bounded(self.inner.find_user_by_email(email)).await
    }

    async fn put_user(&self, user: &User) -> StoreResult<()> {
        self.bounded(self.inner.put_user(user)).await
    }

    async fn get_board(&self, id: Uuid) -> StoreResult<Option<Board>> {
        self.bounded(self.inner.get_board(id)).await
    }

    async fn boards_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Board>> {
        self.bounded(self.inner.boards_for_user(user_id)).await
    }

    async fn put_board(&self, board: &Board) -> StoreResult<()> {
        self.bounded(self.inner.put_board(board)).await
    }

    async fn delete_board(&self, id: Uuid) -> StoreResult<()> {
        self.bounded(self.inner.delete_board(id)).await
    }

    async fn get_column(&self, id: Uuid) -> StoreResult<Option<Column>> {
        self.bounded(self.inner.get_column(id)).await
    }

    async fn columns_for_board(&self, board_id: Uuid) -> StoreResult<Vec<Column>> {
        self.bounded(self.inner.columns_for_board(board_id)).await
    }

    async fn write_columns(&self, upserts: &[Column], removals: &[Uuid]) -> StoreResult<()> {
        self.bounded(self.inner.write_columns(upserts, removals)).await
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        self.bounded(self.inner.get_task(id)).await
    }

    async fn tasks_for_column(&self, column_id: Uuid) -> StoreResult<Vec<Task>> {
        self.bounded(self.inner.tasks_for_column(column_id)).await
    }

    async fn write_tasks(&self, upserts: &[Task], removals: &[Uuid]) -> StoreResult<()> {
        self.bounded(self.inner.write_tasks(upserts, removals)).await
    }
}
