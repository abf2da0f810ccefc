/**
 * Board Data Structure
 *
 * A board owns an ordered set of columns and a membership roster. The
 * creator is implicitly both a member and an admin and is never stored in
 * the `members` or `admins` sets; every other admin must also be a member.
 *
 * Column order is not stored on the board. It is derived from each
 * column's own `board_id` and `position`.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Who can be invited to a board
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Open to workspace members; accepts new members
    Workspace,
    /// Creator-only board; rejects member additions
    Private,
}

/// A collaborative task board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub visibility: Visibility,
    /// Owning user
    pub created_by: Uuid,
    /// Members other than the creator
    #[serde(default)]
    pub members: BTreeSet<Uuid>,
    /// Admins other than the creator (always a subset of `members`)
    #[serde(default)]
    pub admins: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Create a board owned by `created_by`
    pub fn new(
        title: String,
        description: Option<String>,
        visibility: Visibility,
        created_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            visibility,
            created_by,
            members: BTreeSet::new(),
            admins: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    /// True for the creator and every explicit member
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.is_creator(user_id) || self.members.contains(&user_id)
    }

    /// True for the creator and every explicit admin
    pub fn is_admin(&self, user_id: Uuid) -> bool {
        self.is_creator(user_id) || self.admins.contains(&user_id)
    }

    /// Creator followed by every member
    pub fn participants(&self) -> Vec<Uuid> {
        std::iter::once(self.created_by)
            .chain(self.members.iter().copied())
            .collect()
    }

    /// Add a member. Returns false if the user already belongs to the board.
    pub fn add_member(&mut self, user_id: Uuid) -> bool {
        if self.is_member(user_id) {
            return false;
        }
        self.members.insert(user_id);
        self.touch();
        true
    }

    /// Remove a member and any admin grant they held.
    ///
    /// The creator cannot be removed.
    pub fn remove_member(&mut self, user_id: Uuid) -> bool {
        if self.is_creator(user_id) || !self.members.remove(&user_id) {
            return false;
        }
        self.admins.remove(&user_id);
        self.touch();
        true
    }

    /// Promote an existing member. Returns false when nothing changed.
    pub fn grant_admin(&mut self, user_id: Uuid) -> bool {
        if self.is_admin(user_id) || !self.members.contains(&user_id) {
            return false;
        }
        self.admins.insert(user_id);
        self.touch();
        true
    }

    /// Demote an admin. The creator cannot be demoted.
    pub fn revoke_admin(&mut self, user_id: Uuid) -> bool {
        if self.is_creator(user_id) || !self.admins.remove(&user_id) {
            return false;
        }
        self.touch();
        true
    }

    /// `admins ⊆ members` and the creator never appears in either set
    pub fn roster_is_consistent(&self) -> bool {
        self.admins.is_subset(&self.members)
            && !self.members.contains(&self.created_by)
            && !self.admins.contains(&self.created_by)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
