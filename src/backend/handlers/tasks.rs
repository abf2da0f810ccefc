//! Task and Comment HTTP Handlers

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::backend::error::{ApiJson, ApiPath, BackendError};
use crate::backend::middleware::AuthUser;
use crate::backend::mutations::MutationCoordinator;
use crate::shared::requests::{AddCommentRequest, CreateTaskRequest, MoveTaskRequest, UpdateTaskRequest};
use crate::shared::{Comment, Task};

/// POST /api/tasks
pub async fn create_task(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiJson(request): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), BackendError> {
    let task = coordinator.create_task(&user.caller(), request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/columns/{id}/tasks
pub async fn list_tasks(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(column_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Task>>, BackendError> {
    Ok(Json(coordinator.list_tasks(&user.caller(), column_id).await?))
}

/// PATCH /api/tasks/{id}
pub async fn update_task(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateTaskRequest>,
) -> Result<Json<Task>, BackendError> {
    Ok(Json(coordinator.update_task(&user.caller(), task_id, request).await?))
}

/// PUT /api/tasks/{id}/move
pub async fn move_task(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<MoveTaskRequest>,
) -> Result<Json<Task>, BackendError> {
    Ok(Json(coordinator.move_task(&user.caller(), task_id, request).await?))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(task_id): ApiPath<Uuid>,
) -> Result<StatusCode, BackendError> {
    coordinator.delete_task(&user.caller(), task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tasks/{id}/comments
pub async fn add_comment(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AddCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), BackendError> {
    let comment = coordinator.add_comment(&user.caller(), task_id, request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
