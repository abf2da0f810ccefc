/**
 * Dense Position Sequences
 *
 * Pure operations over the siblings of one parent (columns of a board, tasks
 * of a column). Positions are 1-based and dense: a parent with N children
 * holds exactly the positions `1..=N`.
 *
 * Every function takes the siblings sorted by position, mutates them in
 * place and reports which ids changed so the caller writes only those.
 *
 * # Shifting rules
 *
 * ```text
 * move later   (old < new): siblings in (old, new]  shift back by one
 * move earlier (new < old): siblings in [new, old)  shift forward by one
 * remove at p:              siblings after p        shift back by one
 * insert at p:              siblings at or after p  shift forward by one
 * ```
 */

use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::shared::{Column, Task};

/// An item ordered among the children of one parent
pub trait Positioned: Clone {
    fn id(&self) -> Uuid;
    fn parent_id(&self) -> Uuid;
    fn position(&self) -> i32;
    fn set_position(&mut self, position: i32);
    fn set_parent(&mut self, parent_id: Uuid);
}

impl Positioned for Column {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Uuid {
        self.board_id
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    fn set_parent(&mut self, parent_id: Uuid) {
        self.board_id = parent_id;
    }
}

impl Positioned for Task {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Uuid {
        self.column_id
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    fn set_parent(&mut self, parent_id: Uuid) {
        self.column_id = parent_id;
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderingError {
    #[error("positions start at 1, got {0}")]
    InvalidPosition(i32),

    #[error("item {0} is not among the siblings")]
    ItemNotFound(Uuid),

    #[error("sibling positions are not dense: {0:?}")]
    NotDense(Vec<i32>),

    #[error("expected a permutation of {expected} sibling ids")]
    NotAPermutation { expected: usize },
}

impl OrderingError {
    /// Map to the backend taxonomy, naming the entity kind for lookups
    pub fn into_backend(self, entity: &'static str) -> BackendError {
        match self {
            Self::InvalidPosition(_) => BackendError::validation("position", self.to_string()),
            Self::ItemNotFound(id) => BackendError::not_found(entity, id),
            Self::NotDense(_) => BackendError::conflict(self.to_string()),
            Self::NotAPermutation { .. } => BackendError::validation("columnIds", self.to_string()),
        }
    }
}

/// Result of a position change within one parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub old_position: i32,
    pub new_position: i32,
    /// Every id whose position changed, the moved item included
    pub changed: Vec<Uuid>,
}

fn sibling_count(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

fn check_position(position: i32) -> Result<(), OrderingError> {
    if position < 1 {
        return Err(OrderingError::InvalidPosition(position));
    }
    Ok(())
}

/// Position for a new trailing sibling: `max + 1`, or 1 when empty
pub fn next_position<T: Positioned>(siblings: &[T]) -> i32 {
    siblings
        .iter()
        .map(Positioned::position)
        .max()
        .map_or(1, |max| max + 1)
}

/// Move one sibling to `new_position` within the same parent.
///
/// Targets past the end are clamped to the last position. Returns `None`
/// for a null move.
pub fn move_within<T: Positioned>(
    siblings: &mut [T],
    item_id: Uuid,
    new_position: i32,
) -> Result<Option<MovePlan>, OrderingError> {
    check_position(new_position)?;
    let old_position = siblings
        .iter()
        .find(|s| s.id() == item_id)
        .map(Positioned::position)
        .ok_or(OrderingError::ItemNotFound(item_id))?;
    let new_position = new_position.min(sibling_count(siblings.len()));

    if old_position == new_position {
        return Ok(None);
    }

    let mut changed = Vec::new();
    for sibling in siblings.iter_mut() {
        let position = sibling.position();
        if sibling.id() == item_id {
            sibling.set_position(new_position);
        } else if new_position > old_position && position > old_position && position <= new_position {
            sibling.set_position(position - 1);
        } else if new_position < old_position && position >= new_position && position < old_position {
            sibling.set_position(position + 1);
        } else {
            continue;
        }
        changed.push(sibling.id());
    }

    Ok(Some(MovePlan {
        old_position,
        new_position,
        changed,
    }))
}

/// Detach a sibling and close the gap it leaves.
///
/// Returns the removed item and the ids of the siblings that shifted.
pub fn remove_from<T: Positioned>(
    siblings: &mut Vec<T>,
    item_id: Uuid,
) -> Result<(T, Vec<Uuid>), OrderingError> {
    let index = siblings
        .iter()
        .position(|s| s.id() == item_id)
        .ok_or(OrderingError::ItemNotFound(item_id))?;
    let removed = siblings.remove(index);

    let mut shifted = Vec::new();
    for sibling in siblings.iter_mut() {
        if sibling.position() > removed.position() {
            sibling.set_position(sibling.position() - 1);
            shifted.push(sibling.id());
        }
    }
    Ok((removed, shifted))
}

/// Insert `item` at `position` under `parent_id`, opening a slot for it.
///
/// Positions past the end append. Returns the position taken and the ids
/// of the siblings that shifted.
pub fn insert_into<T: Positioned>(
    siblings: &mut Vec<T>,
    parent_id: Uuid,
    mut item: T,
    position: i32,
) -> Result<(i32, Vec<Uuid>), OrderingError> {
    check_position(position)?;
    let position = position.min(sibling_count(siblings.len()) + 1);

    let mut shifted = Vec::new();
    for sibling in siblings.iter_mut() {
        if sibling.position() >= position {
            sibling.set_position(sibling.position() + 1);
            shifted.push(sibling.id());
        }
    }

    item.set_parent(parent_id);
    item.set_position(position);
    let index = siblings
        .iter()
        .position(|s| s.position() > position)
        .unwrap_or(siblings.len());
    siblings.insert(index, item);
    Ok((position, shifted))
}

/// Assign positions `1..=N` following `order`, which must name every
/// sibling exactly once. Returns the ids whose position changed.
pub fn reorder<T: Positioned>(siblings: &mut Vec<T>, order: &[Uuid]) -> Result<Vec<Uuid>, OrderingError> {
    let unique: HashSet<Uuid> = order.iter().copied().collect();
    let is_permutation = order.len() == siblings.len()
        && unique.len() == order.len()
        && siblings.iter().all(|s| unique.contains(&s.id()));
    if !is_permutation {
        return Err(OrderingError::NotAPermutation {
            expected: siblings.len(),
        });
    }

    let mut changed = Vec::new();
    for (index, id) in order.iter().enumerate() {
        let target = sibling_count(index) + 1;
        if let Some(sibling) = siblings.iter_mut().find(|s| s.id() == *id) {
            if sibling.position() != target {
                sibling.set_position(target);
                changed.push(*id);
            }
        }
    }
    sort_by_position(siblings);
    Ok(changed)
}

/// Fail unless positions are exactly `1..=N` with no duplicates
pub fn verify_dense<T: Positioned>(siblings: &[T]) -> Result<(), OrderingError> {
    let mut positions: Vec<i32> = siblings.iter().map(Positioned::position).collect();
    positions.sort_unstable();
    let dense = positions
        .iter()
        .enumerate()
        .all(|(index, position)| *position == sibling_count(index) + 1);
    if dense {
        Ok(())
    } else {
        Err(OrderingError::NotDense(positions))
    }
}

pub fn sort_by_position<T: Positioned>(siblings: &mut [T]) {
    siblings.sort_by_key(Positioned::position);
}
