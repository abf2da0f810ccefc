//! Board HTTP Handlers

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::backend::error::{ApiJson, ApiPath, BackendError};
use crate::backend::middleware::AuthUser;
use crate::backend::mutations::MutationCoordinator;
use crate::shared::requests::{CreateBoardRequest, MemberRequest, UpdateBoardRequest};
use crate::shared::Board;

/// POST /api/boards
pub async fn create_board(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiJson(request): ApiJson<CreateBoardRequest>,
) -> Result<(StatusCode, Json<Board>), BackendError> {
    let board = coordinator.create_board(&user.caller(), request).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

/// GET /api/boards
pub async fn list_boards(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
) -> Result<Json<Vec<Board>>, BackendError> {
    Ok(Json(coordinator.list_boards(&user.caller()).await?))
}

/// GET /api/boards/{id}
pub async fn get_board(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
) -> Result<Json<Board>, BackendError> {
    Ok(Json(coordinator.get_board(&user.caller(), board_id).await?))
}

/// PATCH /api/boards/{id}
pub async fn update_board(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateBoardRequest>,
) -> Result<Json<Board>, BackendError> {
    Ok(Json(coordinator.update_board(&user.caller(), board_id, request).await?))
}

/// DELETE /api/boards/{id}
pub async fn delete_board(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
) -> Result<StatusCode, BackendError> {
    coordinator.delete_board(&user.caller(), board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/boards/{id}/members
pub async fn add_member(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<MemberRequest>,
) -> Result<Json<Board>, BackendError> {
    Ok(Json(
        coordinator.add_member(&user.caller(), board_id, request.user_id).await?,
    ))
}

/// DELETE /api/boards/{id}/members/{user_id}
pub async fn remove_member(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath((board_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Board>, BackendError> {
    Ok(Json(coordinator.remove_member(&user.caller(), board_id, user_id).await?))
}

/// POST /api/boards/{id}/admins
pub async fn grant_admin(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<MemberRequest>,
) -> Result<Json<Board>, BackendError> {
    Ok(Json(
        coordinator.grant_admin(&user.caller(), board_id, request.user_id).await?,
    ))
}

/// DELETE /api/boards/{id}/admins/{user_id}
pub async fn revoke_admin(
    State(coordinator): State<MutationCoordinator>,
    user: AuthUser,
    ApiPath((board_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Board>, BackendError> {
    Ok(Json(coordinator.revoke_admin(&user.caller(), board_id, user_id).await?))
}
