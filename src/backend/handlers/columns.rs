//! Column HTTP Handlers

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::backend::error::{ApiJson, ApiPath, BackendError};
use crate::backend::middleware::AuthUser;
use crate::backend::mutations::MutationCoordinator;
use crate::shared::requests::{CreateColumnRequest, MoveRequest, ReorderColumnsRequest, UpdateColumnRequest};
use crate::shared::{Column, ColumnWithTasks};

/// POST /api/columns
pub async fn create_column(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiJson(request): ApiJson<CreateColumnRequest>,
) -> Result<(StatusCode, Json<Column>), BackendError> {
    let column = coordinator.create_column(&user.caller(), request).await?;
    Ok((StatusCode::CREATED, Json(column)))
}

/// GET /api/boards/{id}/columns
pub async fn list_columns(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
) -> Result<Json<Vec<ColumnWithTasks>>, BackendError> {
    Ok(Json(coordinator.columns_with_tasks(&user.caller(), board_id).await?))
}

/// PATCH /api/columns/{id}
pub async fn update_column(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(column_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateColumnRequest>,
) -> Result<Json<Column>, BackendError> {
    Ok(Json(coordinator.update_column(&user.caller(), column_id, request).await?))
}

/// PUT /api/columns/{id}/move
pub async fn move_column(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(column_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<MoveRequest>,
) -> Result<Json<Column>, BackendError> {
    request.validate()?;
    Ok(Json(
        coordinator.move_column(&user.caller(), column_id, request.position).await?,
    ))
}

/// PUT /api/boards/{id}/columns/order
pub async fn reorder_columns(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ReorderColumnsRequest>,
) -> Result<Json<Vec<Column>>, BackendError> {
    Ok(Json(coordinator.reorder_columns(&user.caller(), board_id, request).await?))
}

/// DELETE /api/columns/{id}
pub async fn delete_column(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(column_id): ApiPath<Uuid>,
) -> Result<StatusCode, BackendError> {
    coordinator.delete_column(&user.caller(), column_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
