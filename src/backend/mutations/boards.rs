//! Board, membership and admin operations
//!
//! Edits to a board document run under the board's scope, so each one
//! re-reads the roster another edit may have just written.

use serde_json::json;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::guard::Action;
use crate::backend::mutations::{participant_rooms, Caller, MutationCoordinator};
use crate::backend::realtime::RoomKey;
use crate::shared::requests::{CreateBoardRequest, UpdateBoardRequest};
use crate::shared::{Board, EventType};

impl MutationCoordinator {
    /// Create a board owned by the caller
    pub async fn create_board(&self, caller: &Caller, request: CreateBoardRequest) -> Result<Board, BackendError> {
        request.validate()?;
        let user = self.resolve_actor(caller).await?;

        let mut board = Board::new(
            request.title.trim().to_string(),
            request.description,
            request.visibility,
            user.id,
        );
        self.require_users(&request.members).await?;
        for member in request.members {
            board.add_member(member);
        }

        self.store.put_board(&board).await?;
        tracing::info!("[Mutation] Board {} created by {}", board.id, user.id);

        let room = RoomKey::Board(board.id);
        for participant in board.participants() {
            self.rooms.join_user(participant, room).await;
        }
        self.announce(
            caller,
            &participant_rooms(&board),
            EventType::BoardCreated,
            json!({ "boardId": board.id, "board": board }),
        )
        .await;
        Ok(board)
    }

    /// Boards where the caller is creator or member
    pub async fn list_boards(&self, caller: &Caller) -> Result<Vec<Board>, BackendError> {
        let user = self.resolve_actor(caller).await?;
        Ok(self.store.boards_for_user(user.id).await?)
    }

    pub async fn get_board(&self, caller: &Caller, board_id: Uuid) -> Result<Board, BackendError> {
        self.guard
            .authorize(board_id, caller.user_id, Action::ViewBoard)
            .await
    }

    pub async fn update_board(
        &self,
        caller: &Caller,
        board_id: Uuid,
        request: UpdateBoardRequest,
    ) -> Result<Board, BackendError> {
        request.validate()?;
        self.resolve_actor(caller).await?;
        let _scope = self.ordering.scopes().lock(board_id).await;
        let mut board = self
            .guard
            .authorize(board_id, caller.user_id, Action::UpdateBoard)
            .await?;

        if let Some(title) = &request.title {
            board.title = title.trim().to_string();
        }
        if let Some(description) = &request.description {
            board.description = Some(description.clone());
        }
        board.touch();
        self.store.put_board(&board).await?;

        self.announce(
            caller,
            &[RoomKey::Board(board_id)],
            EventType::BoardUpdated,
            json!({ "boardId": board_id, "changes": request, "board": board }),
        )
        .await;
        Ok(board)
    }

    /// Delete a board with its columns and tasks
    pub async fn delete_board(&self, caller: &Caller, board_id: Uuid) -> Result<(), BackendError> {
        self.resolve_actor(caller).await?;
        let _scope = self.ordering.scopes().lock(board_id).await;
        let board = self
            .guard
            .authorize(board_id, caller.user_id, Action::DeleteBoard)
            .await?;

        let column_ids: Vec<Uuid> = self
            .store
            .columns_for_board(board_id)
            .await?
            .iter()
            .map(|column| column.id)
            .collect();
        let _columns = self.ordering.scopes().lock_all(&column_ids).await;
        self.store.delete_board(board_id).await?;
        tracing::info!("[Mutation] Board {} deleted by {}", board_id, caller.user_id);

        let room = RoomKey::Board(board_id);
        let mut rooms = participant_rooms(&board);
        rooms.push(room);
        self.announce(
            caller,
            &rooms,
            EventType::BoardDeleted,
            json!({ "boardId": board_id, "title": board.title }),
        )
        .await;
        self.rooms.close_room(room).await;
        Ok(())
    }

    pub async fn add_member(&self, caller: &Caller, board_id: Uuid, user_id: Uuid) -> Result<Board, BackendError> {
        self.resolve_actor(caller).await?;
        let _scope = self.ordering.scopes().lock(board_id).await;
        let mut board = self
            .guard
            .authorize(board_id, caller.user_id, Action::AddMember { target: user_id })
            .await?;

        board.add_member(user_id);
        self.store.put_board(&board).await?;
        self.rooms.join_user(user_id, RoomKey::Board(board_id)).await;

        self.announce(
            caller,
            &[RoomKey::Board(board_id)],
            EventType::MemberAdded,
            json!({ "boardId": board_id, "userId": user_id, "members": board.members }),
        )
        .await;
        self.announce(
            caller,
            &[RoomKey::User(user_id)],
            EventType::AddedToBoard,
            json!({ "boardId": board_id, "board": board }),
        )
        .await;
        Ok(board)
    }

    /// Remove a member; any admin grant goes with it
    pub async fn remove_member(&self, caller: &Caller, board_id: Uuid, user_id: Uuid) -> Result<Board, BackendError> {
        self.resolve_actor(caller).await?;
        let _scope = self.ordering.scopes().lock(board_id).await;
        let mut board = self
            .guard
            .authorize(board_id, caller.user_id, Action::RemoveMember { target: user_id })
            .await?;

        board.remove_member(user_id);
        self.store.put_board(&board).await?;

        self.announce(
            caller,
            &[RoomKey::Board(board_id)],
            EventType::MemberRemoved,
            json!({ "boardId": board_id, "userId": user_id, "members": board.members }),
        )
        .await;
        self.announce(
            caller,
            &[RoomKey::User(user_id)],
            EventType::RemovedFromBoard,
            json!({ "boardId": board_id, "title": board.title }),
        )
        .await;
        self.rooms.leave_user(user_id, RoomKey::Board(board_id)).await;
        Ok(board)
    }

    /// Promote a member. Promoting an existing admin changes nothing.
    pub async fn grant_admin(&self, caller: &Caller, board_id: Uuid, user_id: Uuid) -> Result<Board, BackendError> {
        self.resolve_actor(caller).await?;
        let _scope = self.ordering.scopes().lock(board_id).await;
        let mut board = self
            .guard
            .authorize(board_id, caller.user_id, Action::GrantAdmin { target: user_id })
            .await?;

        if !board.grant_admin(user_id) {
            return Ok(board);
        }
        self.store.put_board(&board).await?;

        self.announce(
            caller,
            &[RoomKey::Board(board_id)],
            EventType::AdminAdded,
            json!({ "boardId": board_id, "userId": user_id, "admins": board.admins }),
        )
        .await;
        Ok(board)
    }

    /// Demote an admin. Demoting a non-admin changes nothing.
    pub async fn revoke_admin(&self, caller: &Caller, board_id: Uuid, user_id: Uuid) -> Result<Board, BackendError> {
        self.resolve_actor(caller).await?;
        let _scope = self.ordering.scopes().lock(board_id).await;
        let mut board = self
            .guard
            .authorize(board_id, caller.user_id, Action::RevokeAdmin { target: user_id })
            .await?;

        if !board.revoke_admin(user_id) {
            return Ok(board);
        }
        self.store.put_board(&board).await?;

        self.announce(
            caller,
            &[RoomKey::Board(board_id)],
            EventType::AdminRemoved,
            json!({ "boardId": board_id, "userId": user_id, "admins": board.admins }),
        )
        .await;
        Ok(board)
    }
}
