//! Column operations
//!
//! Columns are ordered within their board. Creation appends, moves and
//! deletes go through the ordered collection under the board's scope.
//! Deletion also holds the column's own scope until its tasks are gone.

use serde_json::json;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::guard::Action;
use crate::backend::mutations::{Caller, MutationCoordinator};
use crate::backend::ordering::MoveOutcome;
use crate::backend::realtime::RoomKey;
use crate::shared::requests::{CreateColumnRequest, ReorderColumnsRequest, UpdateColumnRequest};
use crate::shared::{Column, ColumnWithTasks, EventType};

fn column_ids(columns: &[Column]) -> Vec<Uuid> {
    columns.iter().map(|column| column.id).collect()
}

impl MutationCoordinator {
    /// Append a column to a board
    pub async fn create_column(&self, caller: &Caller, request: CreateColumnRequest) -> Result<Column, BackendError> {
        request.validate()?;
        self.resolve_actor(caller).await?;
        self.guard
            .authorize(request.board_id, caller.user_id, Action::ManageColumns)
            .await?;

        let column = Column::new(request.board_id, request.title.trim().to_string());
        let column = self.ordering.append(&self.columns(), column).await?;

        self.announce(
            caller,
            &[RoomKey::Board(column.board_id)],
            EventType::ColumnCreated,
            json!({ "boardId": column.board_id, "columnId": column.id, "column": column }),
        )
        .await;
        Ok(column)
    }

    /// Columns of a board in order, each with its tasks in order
    pub async fn columns_with_tasks(&self, caller: &Caller, board_id: Uuid) -> Result<Vec<ColumnWithTasks>, BackendError> {
        self.guard
            .authorize(board_id, caller.user_id, Action::ViewBoard)
            .await?;

        let columns = self.store.columns_for_board(board_id).await?;
        let mut result = Vec::with_capacity(columns.len());
        for column in columns {
            let tasks = self.store.tasks_for_column(column.id).await?;
            result.push(ColumnWithTasks { column, tasks });
        }
        Ok(result)
    }

    pub async fn update_column(
        &self,
        caller: &Caller,
        column_id: Uuid,
        request: UpdateColumnRequest,
    ) -> Result<Column, BackendError> {
        request.validate()?;
        self.resolve_actor(caller).await?;
        let column = self.find_column(column_id).await?;
        self.guard
            .authorize(column.board_id, caller.user_id, Action::ManageColumns)
            .await?;

        let title = request.title.trim().to_string();
        let column = self
            .ordering
            .update(&self.columns(), column_id, |column| {
                column.title = title.clone();
                column.updated_at = chrono::Utc::now();
                Ok(())
            })
            .await?;

        self.announce(
            caller,
            &[RoomKey::Board(column.board_id)],
            EventType::ColumnUpdated,
            json!({ "boardId": column.board_id, "columnId": column.id, "title": column.title, "column": column }),
        )
        .await;
        Ok(column)
    }

    /// Move a column within its board. A null move writes and emits nothing.
    pub async fn move_column(&self, caller: &Caller, column_id: Uuid, position: i32) -> Result<Column, BackendError> {
        self.resolve_actor(caller).await?;
        let column = self.find_column(column_id).await?;
        self.guard
            .authorize(column.board_id, caller.user_id, Action::ManageColumns)
            .await?;

        match self.ordering.move_item(&self.columns(), column_id, position).await? {
            MoveOutcome::Unchanged(column) => Ok(column),
            MoveOutcome::Moved {
                item,
                old_position,
                new_position,
                siblings,
                ..
            } => {
                self.announce(
                    caller,
                    &[RoomKey::Board(item.board_id)],
                    EventType::ColumnMoved,
                    json!({
                        "boardId": item.board_id,
                        "columnId": item.id,
                        "column": item,
                        "oldPosition": old_position,
                        "newPosition": new_position,
                        "columnOrder": column_ids(&siblings),
                    }),
                )
                .await;
                Ok(item)
            }
        }
    }

    /// Rewrite the full column order of a board
    pub async fn reorder_columns(
        &self,
        caller: &Caller,
        board_id: Uuid,
        request: ReorderColumnsRequest,
    ) -> Result<Vec<Column>, BackendError> {
        self.resolve_actor(caller).await?;
        self.guard
            .authorize(board_id, caller.user_id, Action::ManageColumns)
            .await?;

        let columns = self
            .ordering
            .reorder(&self.columns(), board_id, &request.column_ids)
            .await?;

        self.announce(
            caller,
            &[RoomKey::Board(board_id)],
            EventType::ColumnsReordered,
            json!({ "boardId": board_id, "columnOrder": column_ids(&columns), "columns": columns }),
        )
        .await;
        Ok(columns)
    }

    /// Delete a column with its tasks and close the gap in the board
    pub async fn delete_column(&self, caller: &Caller, column_id: Uuid) -> Result<(), BackendError> {
        self.resolve_actor(caller).await?;
        let column = self.find_column(column_id).await?;
        self.guard
            .authorize(column.board_id, caller.user_id, Action::ManageColumns)
            .await?;

        let removal = self
            .ordering
            .remove_with_children(&self.columns(), column_id)
            .await?;

        self.announce(
            caller,
            &[RoomKey::Board(column.board_id)],
            EventType::ColumnDeleted,
            json!({
                "boardId": column.board_id,
                "columnId": column_id,
                "columnOrder": column_ids(&removal.siblings),
            }),
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mutations::tests::{fixture, Fixture};
    use crate::shared::requests::{CreateBoardRequest, CreateTaskRequest};
    use crate::shared::{Actor, Board, Visibility};
    use pretty_assertions::assert_eq;

    async fn board(coordinator: &MutationCoordinator, owner: Uuid) -> Board {
        coordinator
            .create_board(
                &Caller::rest(owner),
                CreateBoardRequest {
                    title: "Sprint".to_string(),
                    description: None,
                    visibility: Visibility::Workspace,
                    members: Vec::new(),
                },
            )
            .await
            .unwrap()
    }

    async fn add_columns(coordinator: &MutationCoordinator, caller: &Caller, board_id: Uuid, count: usize) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for index in 0..count {
            let column = coordinator
                .create_column(
                    caller,
                    CreateColumnRequest {
                        board_id,
                        title: format!("Column {}", index + 1),
                    },
                )
                .await
                .unwrap();
            ids.push(column.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_columns_append_in_order() {
        let Fixture { coordinator, ada, .. } = fixture().await;
        let caller = Caller::rest(ada);
        let board = board(&coordinator, ada).await;
        let ids = add_columns(&coordinator, &caller, board.id, 3).await;

        let listed = coordinator.columns_with_tasks(&caller, board.id).await.unwrap();
        let positions: Vec<(Uuid, i32)> = listed.iter().map(|c| (c.column.id, c.column.position)).collect();
        assert_eq!(positions, vec![(ids[0], 1), (ids[1], 2), (ids[2], 3)]);
    }

    #[tokio::test]
    async fn test_null_move_emits_nothing() {
        let Fixture { coordinator, ada, .. } = fixture().await;
        let caller = Caller::rest(ada);
        let board = board(&coordinator, ada).await;
        let ids = add_columns(&coordinator, &caller, board.id, 2).await;
        let (conn, mut rx) = coordinator.rooms().connect(Actor::new(ada, "ada")).await;
        coordinator.rooms().join(conn, RoomKey::Board(board.id)).await;

        let column = coordinator.move_column(&caller, ids[1], 2).await.unwrap();
        assert_eq!(column.position, 2);
        assert!(rx.try_recv().is_err());

        coordinator.move_column(&caller, ids[1], 1).await.unwrap();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.event, EventType::ColumnMoved);
        assert_eq!(event.payload["oldPosition"], 2);
        assert_eq!(event.payload["newPosition"], 1);
    }

    #[tokio::test]
    async fn test_reorder_and_delete() {
        let Fixture { coordinator, store, ada, .. } = fixture().await;
        let caller = Caller::rest(ada);
        let board = board(&coordinator, ada).await;
        let ids = add_columns(&coordinator, &caller, board.id, 3).await;

        coordinator
            .reorder_columns(
                &caller,
                board.id,
                ReorderColumnsRequest {
                    column_ids: vec![ids[2], ids[0], ids[1]],
                },
            )
            .await
            .unwrap();
        coordinator.delete_column(&caller, ids[0]).await.unwrap();

        let remaining: Vec<(Uuid, i32)> = store
            .columns_for_board(board.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.id, c.position))
            .collect();
        assert_eq!(remaining, vec![(ids[2], 1), (ids[1], 2)]);
    }

    #[tokio::test]
    async fn test_task_create_racing_column_delete_is_not_found() {
        let Fixture { coordinator, store, ada, .. } = fixture().await;
        let caller = Caller::rest(ada);
        let board = board(&coordinator, ada).await;
        let column_id = add_columns(&coordinator, &caller, board.id, 1).await[0];

        // An in-flight task write on the column
        let in_flight = coordinator.ordering().scopes().lock(column_id).await;
        let delete = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.delete_column(&caller, column_id).await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!delete.is_finished());

        let create = tokio::spawn({
            let coordinator = coordinator.clone();
            async move {
                coordinator
                    .create_task(
                        &caller,
                        CreateTaskRequest {
                            column_id,
                            title: "late".to_string(),
                            description: None,
                            assignee: None,
                            tags: Default::default(),
                            due_date: None,
                        },
                    )
                    .await
            }
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        drop(in_flight);

        delete.await.unwrap().unwrap();
        let err = create.await.unwrap().unwrap_err();
        match err {
            BackendError::NotFound { entity, .. } => assert_eq!(entity, "Column"),
            _ => panic!("Expected NotFound"),
        }
        assert!(store.get_column(column_id).await.unwrap().is_none());
        assert!(store.tasks_for_column(column_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outsider_cannot_create_column() {
        let Fixture { coordinator, ada, bob, .. } = fixture().await;
        let board = board(&coordinator, ada).await;
        let err = coordinator
            .create_column(
                &Caller::rest(bob),
                CreateColumnRequest {
                    board_id: board.id,
                    title: "Nope".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Forbidden { .. }));
    }
}
