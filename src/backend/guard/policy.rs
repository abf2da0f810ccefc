/**
 * Board Permission Policy
 *
 * Pure decision table mapping (board, acting user, action) to an allow/deny
 * verdict with a reason code. Nothing here touches the store.
 *
 * | Action                         | Allowed for                       |
 * |--------------------------------|-----------------------------------|
 * | create board                   | any authenticated user            |
 * | view board                     | members                           |
 * | update board, delete board     | creator                           |
 * | add member                     | creator, workspace boards only    |
 * | remove member                  | creator or admin                  |
 * | grant / revoke admin           | creator                           |
 * | columns, tasks, comments       | members                           |
 */

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::shared::{Board, Visibility};

/// Something a user asks to do on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateBoard,
    ViewBoard,
    UpdateBoard,
    DeleteBoard,
    AddMember { target: Uuid },
    RemoveMember { target: Uuid },
    GrantAdmin { target: Uuid },
    RevokeAdmin { target: Uuid },
    ManageColumns,
    ManageTasks,
    AddComment,
}

/// Why a decision came out the way it did
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    // allow
    Authenticated,
    Creator,
    Admin,
    Member,

    // deny
    NotMember,
    NotCreator,
    NotAdmin,
    PrivateBoard,
    AlreadyMember,
    TargetIsCreator,
    TargetNotMember,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticated => "authenticated",
            Self::Creator => "creator",
            Self::Admin => "admin",
            Self::Member => "member",
            Self::NotMember => "not_member",
            Self::NotCreator => "not_creator",
            Self::NotAdmin => "not_admin",
            Self::PrivateBoard => "private_board",
            Self::AlreadyMember => "already_member",
            Self::TargetIsCreator => "target_is_creator",
            Self::TargetNotMember => "target_not_member",
        }
    }

    /// Denials about the target rather than the caller's rights
    pub fn is_about_target(&self) -> bool {
        matches!(
            self,
            Self::AlreadyMember | Self::TargetIsCreator | Self::TargetNotMember
        )
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub reason: Reason,
}

impl Decision {
    fn allow(reason: Reason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    fn deny(reason: Reason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

fn membership(board: &Board, user_id: Uuid) -> Decision {
    if board.is_creator(user_id) {
        Decision::allow(Reason::Creator)
    } else if board.is_admin(user_id) {
        Decision::allow(Reason::Admin)
    } else if board.is_member(user_id) {
        Decision::allow(Reason::Member)
    } else {
        Decision::deny(Reason::NotMember)
    }
}

fn creator_only(board: &Board, user_id: Uuid) -> Decision {
    if board.is_creator(user_id) {
        Decision::allow(Reason::Creator)
    } else if board.is_member(user_id) {
        Decision::deny(Reason::NotCreator)
    } else {
        Decision::deny(Reason::NotMember)
    }
}

/// Decide whether `user_id` may perform `action` on `board`
pub fn decide(board: &Board, user_id: Uuid, action: &Action) -> Decision {
    match *action {
        Action::CreateBoard => Decision::allow(Reason::Authenticated),

        Action::ViewBoard | Action::ManageColumns | Action::ManageTasks | Action::AddComment => {
            membership(board, user_id)
        }

        Action::UpdateBoard | Action::DeleteBoard => creator_only(board, user_id),

        Action::AddMember { target } => {
            let caller = creator_only(board, user_id);
            if !caller.allowed {
                caller
            } else if board.visibility == Visibility::Private {
                Decision::deny(Reason::PrivateBoard)
            } else if board.is_creator(target) {
                Decision::deny(Reason::TargetIsCreator)
            } else if board.is_member(target) {
                Decision::deny(Reason::AlreadyMember)
            } else {
                caller
            }
        }

        Action::RemoveMember { target } => {
            let caller = if board.is_creator(user_id) {
                Decision::allow(Reason::Creator)
            } else if board.is_admin(user_id) {
                Decision::allow(Reason::Admin)
            } else if board.is_member(user_id) {
                Decision::deny(Reason::NotAdmin)
            } else {
                Decision::deny(Reason::NotMember)
            };
            if !caller.allowed {
                caller
            } else if board.is_creator(target) {
                Decision::deny(Reason::TargetIsCreator)
            } else if !board.is_member(target) {
                Decision::deny(Reason::TargetNotMember)
            } else {
                caller
            }
        }

        // An existing admin is allowed through; the grant is then a no-op.
        Action::GrantAdmin { target } => {
            let caller = creator_only(board, user_id);
            if caller.allowed && !board.is_member(target) {
                Decision::deny(Reason::TargetNotMember)
            } else {
                caller
            }
        }

        Action::RevokeAdmin { target } => {
            let caller = creator_only(board, user_id);
            if caller.allowed && board.is_creator(target) {
                Decision::deny(Reason::TargetIsCreator)
            } else {
                caller
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Roster {
        board: Board,
        creator: Uuid,
        admin: Uuid,
        member: Uuid,
        outsider: Uuid,
    }

    fn roster(visibility: Visibility) -> Roster {
        let creator = Uuid::new_v4();
        let (admin, member, outsider) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut board = Board::new("Launch".to_string(), None, visibility, creator);
        board.add_member(admin);
        board.add_member(member);
        board.grant_admin(admin);
        Roster {
            board,
            creator,
            admin,
            member,
            outsider,
        }
    }

    #[test]
    fn test_members_manage_content() {
        let r = roster(Visibility::Workspace);
        for user in [r.creator, r.admin, r.member] {
            assert!(decide(&r.board, user, &Action::ManageTasks).allowed);
            assert!(decide(&r.board, user, &Action::AddComment).allowed);
        }
        let decision = decide(&r.board, r.outsider, &Action::ManageColumns);
        assert_eq!(decision, Decision::deny(Reason::NotMember));
    }

    #[test]
    fn test_only_creator_deletes() {
        let r = roster(Visibility::Workspace);
        assert!(decide(&r.board, r.creator, &Action::DeleteBoard).allowed);
        assert_eq!(
            decide(&r.board, r.admin, &Action::DeleteBoard).reason,
            Reason::NotCreator
        );
        assert_eq!(
            decide(&r.board, r.member, &Action::UpdateBoard).reason,
            Reason::NotCreator
        );
    }

    #[test]
    fn test_add_member_rules() {
        let r = roster(Visibility::Workspace);
        let newcomer = Uuid::new_v4();
        assert!(decide(&r.board, r.creator, &Action::AddMember { target: newcomer }).allowed);
        assert_eq!(
            decide(&r.board, r.admin, &Action::AddMember { target: newcomer }).reason,
            Reason::NotCreator
        );
        assert_eq!(
            decide(&r.board, r.creator, &Action::AddMember { target: r.member }).reason,
            Reason::AlreadyMember
        );
        assert_eq!(
            decide(&r.board, r.creator, &Action::AddMember { target: r.creator }).reason,
            Reason::TargetIsCreator
        );
    }

    #[test]
    fn test_private_board_rejects_members() {
        let creator = Uuid::new_v4();
        let board = Board::new("Diary".to_string(), None, Visibility::Private, creator);
        let decision = decide(&board, creator, &Action::AddMember { target: Uuid::new_v4() });
        assert_eq!(decision, Decision::deny(Reason::PrivateBoard));
    }

    #[test]
    fn test_remove_member_rules() {
        let r = roster(Visibility::Workspace);
        assert!(decide(&r.board, r.admin, &Action::RemoveMember { target: r.member }).allowed);
        assert_eq!(
            decide(&r.board, r.member, &Action::RemoveMember { target: r.admin }).reason,
            Reason::NotAdmin
        );
        assert_eq!(
            decide(&r.board, r.admin, &Action::RemoveMember { target: r.creator }).reason,
            Reason::TargetIsCreator
        );
        assert_eq!(
            decide(&r.board, r.creator, &Action::RemoveMember { target: r.outsider }).reason,
            Reason::TargetNotMember
        );
    }

    #[test]
    fn test_admin_grants() {
        let r = roster(Visibility::Workspace);
        assert!(decide(&r.board, r.creator, &Action::GrantAdmin { target: r.member }).allowed);
        assert!(decide(&r.board, r.creator, &Action::GrantAdmin { target: r.admin }).allowed);
        assert_eq!(
            decide(&r.board, r.creator, &Action::GrantAdmin { target: r.outsider }).reason,
            Reason::TargetNotMember
        );
        assert_eq!(
            decide(&r.board, r.admin, &Action::GrantAdmin { target: r.member }).reason,
            Reason::NotCreator
        );
        assert_eq!(
            decide(&r.board, r.creator, &Action::RevokeAdmin { target: r.creator }).reason,
            Reason::TargetIsCreator
        );
    }

    #[test]
    fn test_create_board_always_allowed() {
        let r = roster(Visibility::Private);
        assert!(decide(&r.board, r.outsider, &Action::CreateBoard).allowed);
    }
}
