//! Task and comment operations
//!
//! Tasks are ordered within their column. A move may name another column of
//! the same board, in which case the task leaves one sequence and enters the
//! other with both parent scopes held.

use serde_json::json;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::guard::Action;
use crate::backend::mutations::{Caller, MutationCoordinator};
use crate::backend::ordering::MoveOutcome;
use crate::backend::realtime::RoomKey;
use crate::shared::requests::{AddCommentRequest, CreateTaskRequest, MoveTaskRequest, UpdateTaskRequest};
use crate::shared::{Board, Column, Comment, EventType, Task};

fn require_assignee(board: &Board, assignee: Uuid) -> Result<(), BackendError> {
    if board.is_member(assignee) {
        Ok(())
    } else {
        Err(BackendError::validation("assignee", "assignee must be a board member"))
    }
}

impl MutationCoordinator {
    /// Resolve a task's column and authorize `action` on its board
    async fn authorize_task(
        &self,
        caller: &Caller,
        task_id: Uuid,
        action: Action,
    ) -> Result<(Task, Column, Board), BackendError> {
        self.resolve_actor(caller).await?;
        let task = self.find_task(task_id).await?;
        let column = self.find_column(task.column_id).await?;
        let board = self
            .guard
            .authorize(column.board_id, caller.user_id, action)
            .await?;
        Ok((task, column, board))
    }

    /// Append a task to a column
    pub async fn create_task(&self, caller: &Caller, request: CreateTaskRequest) -> Result<Task, BackendError> {
        request.validate()?;
        self.resolve_actor(caller).await?;
        let column = self.find_column(request.column_id).await?;
        let board = self
            .guard
            .authorize(column.board_id, caller.user_id, Action::ManageTasks)
            .await?;

        let assignee = request.assignee.unwrap_or(caller.user_id);
        require_assignee(&board, assignee)?;

        let mut task = Task::new(column.id, request.title.trim().to_string(), assignee);
        task.description = request.description;
        task.tags = request.tags;
        task.due_date = request.due_date;
        let task = self.ordering.append(&self.tasks(), task).await?;

        self.announce(
            caller,
            &[RoomKey::Board(board.id)],
            EventType::TaskCreated,
            json!({ "boardId": board.id, "columnId": column.id, "taskId": task.id, "task": task }),
        )
        .await;
        Ok(task)
    }

    /// Tasks of a column in order
    pub async fn list_tasks(&self, caller: &Caller, column_id: Uuid) -> Result<Vec<Task>, BackendError> {
        let column = self.find_column(column_id).await?;
        self.guard
            .authorize(column.board_id, caller.user_id, Action::ViewBoard)
            .await?;
        Ok(self.store.tasks_for_column(column_id).await?)
    }

    /// Apply a partial update. An empty update writes and emits nothing.
    pub async fn update_task(
        &self,
        caller: &Caller,
        task_id: Uuid,
        request: UpdateTaskRequest,
    ) -> Result<Task, BackendError> {
        request.validate()?;
        let (task, column, board) = self.authorize_task(caller, task_id, Action::ManageTasks).await?;
        if request.is_empty() {
            return Ok(task);
        }
        if let Some(assignee) = request.assignee {
            require_assignee(&board, assignee)?;
        }

        let task = self
            .ordering
            .update(&self.tasks(), task_id, |task| {
                if let Some(title) = &request.title {
                    task.title = title.trim().to_string();
                }
                if let Some(description) = &request.description {
                    task.description = Some(description.clone());
                }
                if let Some(assignee) = request.assignee {
                    task.assignee = assignee;
                }
                if let Some(tags) = &request.tags {
                    task.tags = tags.clone();
                }
                if let Some(due_date) = request.due_date {
                    task.due_date = Some(due_date);
                }
                task.touch();
                Ok(())
            })
            .await?;

        self.announce(
            caller,
            &[RoomKey::Board(board.id)],
            EventType::TaskUpdated,
            json!({
                "boardId": board.id,
                "columnId": column.id,
                "taskId": task.id,
                "changes": request,
                "task": task,
            }),
        )
        .await;
        Ok(task)
    }

    /// Reorder within the task's column, or move it to another column of
    /// the same board. A null move writes and emits nothing.
    pub async fn move_task(&self, caller: &Caller, task_id: Uuid, request: MoveTaskRequest) -> Result<Task, BackendError> {
        request.validate()?;
        let (task, _, board) = self.authorize_task(caller, task_id, Action::ManageTasks).await?;

        let target_column = request.column_id.unwrap_or(task.column_id);
        if target_column != task.column_id {
            let target = self.find_column(target_column).await?;
            if target.board_id != board.id {
                return Err(BackendError::validation(
                    "columnId",
                    "tasks can only move between columns of the same board",
                ));
            }
        }

        let outcome = self
            .ordering
            .move_across(&self.tasks(), task_id, target_column, request.position)
            .await?;

        let (item, old_parent, old_position, new_position) = match outcome {
            MoveOutcome::Unchanged(task) => return Ok(task),
            MoveOutcome::Moved {
                item,
                old_parent,
                old_position,
                new_position,
                ..
            } => (item, old_parent, old_position, new_position),
        };

        let (event, payload) = if old_parent == item.column_id {
            (
                EventType::TaskReordered,
                json!({
                    "boardId": board.id,
                    "columnId": item.column_id,
                    "taskId": item.id,
                    "task": item,
                    "oldPosition": old_position,
                    "newPosition": new_position,
                }),
            )
        } else {
            (
                EventType::TaskMoved,
                json!({
                    "boardId": board.id,
                    "taskId": item.id,
                    "task": item,
                    "sourceColumnId": old_parent,
                    "destinationColumnId": item.column_id,
                    "oldPosition": old_position,
                    "newPosition": new_position,
                }),
            )
        };
        self.announce(caller, &[RoomKey::Board(board.id)], event, payload).await;
        Ok(item)
    }

    /// Delete a task and close the gap in its column
    pub async fn delete_task(&self, caller: &Caller, task_id: Uuid) -> Result<(), BackendError> {
        let (_, _, board) = self.authorize_task(caller, task_id, Action::ManageTasks).await?;

        let removal = self.ordering.remove(&self.tasks(), task_id).await?;

        self.announce(
            caller,
            &[RoomKey::Board(board.id)],
            EventType::TaskDeleted,
            json!({
                "boardId": board.id,
                "columnId": removal.item.column_id,
                "taskId": task_id,
                "position": removal.item.position,
            }),
        )
        .await;
        Ok(())
    }

    pub async fn add_comment(
        &self,
        caller: &Caller,
        task_id: Uuid,
        request: AddCommentRequest,
    ) -> Result<Comment, BackendError> {
        request.validate()?;
        let (_, _, board) = self.authorize_task(caller, task_id, Action::AddComment).await?;

        let comment = Comment::new(caller.user_id, request.content.trim().to_string());
        let task = self
            .ordering
            .update(&self.tasks(), task_id, |task| {
                task.comments.push(comment.clone());
                Ok(())
            })
            .await?;

        self.announce(
            caller,
            &[RoomKey::Board(board.id)],
            EventType::CommentAdded,
            json!({
                "boardId": board.id,
                "columnId": task.column_id,
                "taskId": task.id,
                "comment": comment,
            }),
        )
        .await;
        Ok(comment)
    }
}
