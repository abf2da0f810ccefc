//! Board Membership Guard
//!
//! Resolves the board and the acting user from the store, then applies the
//! permission policy. Every coordinator write calls `authorize` first.
//!
//! The guard fails closed: a board that does not resolve is `NotFound`, a
//! user that does not resolve is `Unauthorized`, and any denial becomes
//! `Forbidden` (or `Validation` when the target user is the problem).

use std::sync::Arc;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::store::DocumentStore;
use crate::shared::Board;

/// Pure decision table
pub mod policy;

pub use policy::{decide, Action, Decision, Reason};

#[derive(Clone)]
pub struct BoardGuard {
    store: Arc<dyn DocumentStore>,
}

impl BoardGuard {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Authorize `action` and return the board it applies to
    pub async fn authorize(
        &self,
        board_id: Uuid,
        user_id: Uuid,
        action: Action,
    ) -> Result<Board, BackendError> {
        if self.store.get_user(user_id).await?.is_none() {
            tracing::warn!("[Guard] Unknown user {} denied", user_id);
            return Err(BackendError::unauthorized("user no longer exists"));
        }

        let board = self
            .store
            .get_board(board_id)
            .await?
            .ok_or_else(|| BackendError::not_found("Board", board_id))?;

        if let Action::AddMember { target } = action {
            if self.store.get_user(target).await?.is_none() {
                return Err(BackendError::not_found("User", target));
            }
        }

        let decision = decide(&board, user_id, &action);
        if decision.allowed {
            return Ok(board);
        }

        tracing::info!(
            "[Guard] Denied {:?} on board {} for {}: {}",
            action,
            board_id,
            user_id,
            decision.reason
        );
        if decision.reason.is_about_target() {
            Err(BackendError::validation("userId", decision.reason.as_str()))
        } else {
            Err(BackendError::forbidden(decision.reason))
        }
    }
}
