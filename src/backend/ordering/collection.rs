/**
 * Ordered Collection Manager
 *
 * Runs the dense-sequence operations against the store while holding the
 * parent's scope, so that concurrent appends, moves and removals on the same
 * parent are linearized.
 *
 * Each operation reads the item outside the scope to learn its parent, then
 * re-reads it after the scope is held. If the parent changed in between, or
 * the shifted siblings fail the density check, the attempt is abandoned and
 * retried from fresh state with a short backoff. After the configured number
 * of retries the caller receives `Conflict`.
 *
 * Appends and cross-parent moves confirm the destination parent still exists
 * once its scope is held. Parent deletions hold that same scope, so no child
 * is written under a parent that is already gone.
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::ordering::scopes::ParentScopes;
use crate::backend::ordering::sequence::{self, OrderingError, Positioned};
use crate::backend::store::DocumentStore;
use crate::shared::{Column, Task};

/// Where one kind of ordered item is read from and written to
#[async_trait]
pub trait SiblingSource: Send + Sync {
    type Item: Positioned + Send + Sync + 'static;

    /// Entity name used in `NotFound` errors
    const ENTITY: &'static str;

    /// Entity name of the parent
    const PARENT: &'static str;

    async fn fetch(&self, id: Uuid) -> Result<Option<Self::Item>, BackendError>;

    async fn parent_exists(&self, parent_id: Uuid) -> Result<bool, BackendError>;

    /// Children of `parent_id`, sorted by position
    async fn siblings(&self, parent_id: Uuid) -> Result<Vec<Self::Item>, BackendError>;

    /// Persist upserts and removals as one unit
    async fn write(&self, upserts: &[Self::Item], removals: &[Uuid]) -> Result<(), BackendError>;
}

/// Columns, scoped by board
pub struct ColumnSource(pub Arc<dyn DocumentStore>);

#[async_trait]
impl SiblingSource for ColumnSource {
    type Item = Column;
    const ENTITY: &'static str = "Column";
    const PARENT: &'static str = "Board";

    async fn fetch(&self, id: Uuid) -> Result<Option<Column>, BackendError> {
        Ok(self.0.get_column(id).await?)
    }

    async fn parent_exists(&self, parent_id: Uuid) -> Result<bool, BackendError> {
        Ok(self.0.get_board(parent_id).await?.is_some())
    }

    async fn siblings(&self, parent_id: Uuid) -> Result<Vec<Column>, BackendError> {
        Ok(self.0.columns_for_board(parent_id).await?)
    }

    async fn write(&self, upserts: &[Column], removals: &[Uuid]) -> Result<(), BackendError> {
        Ok(self.0.write_columns(upserts, removals).await?)
    }
}

/// Tasks, scoped by column
pub struct TaskSource(pub Arc<dyn DocumentStore>);

#[async_trait]
impl SiblingSource for TaskSource {
    type Item = Task;
    const ENTITY: &'static str = "Task";
    const PARENT: &'static str = "Column";

    async fn fetch(&self, id: Uuid) -> Result<Option<Task>, BackendError> {
        Ok(self.0.get_task(id).await?)
    }

    async fn parent_exists(&self, parent_id: Uuid) -> Result<bool, BackendError> {
        Ok(self.0.get_column(parent_id).await?.is_some())
    }

    async fn siblings(&self, parent_id: Uuid) -> Result<Vec<Task>, BackendError> {
        Ok(self.0.tasks_for_column(parent_id).await?)
    }

    async fn write(&self, upserts: &[Task], removals: &[Uuid]) -> Result<(), BackendError> {
        Ok(self.0.write_tasks(upserts, removals).await?)
    }
}

/// Outcome of a move request
#[derive(Debug, Clone)]
pub enum MoveOutcome<T> {
    /// Null move; nothing was written
    Unchanged(T),
    Moved {
        item: T,
        old_parent: Uuid,
        old_position: i32,
        new_position: i32,
        /// Destination siblings after the move, in order
        siblings: Vec<T>,
    },
}

/// Outcome of a removal
#[derive(Debug, Clone)]
pub struct Removal<T> {
    pub item: T,
    /// Surviving siblings, in order
    pub siblings: Vec<T>,
}

enum Attempt<T> {
    Done(T),
    Retry(String),
}

fn pick<T: Positioned>(items: &[T], ids: &[Uuid]) -> Vec<T> {
    items
        .iter()
        .filter(|item| ids.contains(&item.id()))
        .cloned()
        .collect()
}

#[derive(Clone)]
pub struct OrderedCollection {
    scopes: ParentScopes,
    retries: u32,
}

impl OrderedCollection {
    pub fn new(scopes: ParentScopes, retries: u32) -> Self {
        Self { scopes, retries }
    }

    pub fn scopes(&self) -> &ParentScopes {
        &self.scopes
    }

    async fn require<S: SiblingSource>(source: &S, id: Uuid) -> Result<S::Item, BackendError> {
        source
            .fetch(id)
            .await?
            .ok_or_else(|| BackendError::not_found(S::ENTITY, id))
    }

    async fn require_parent<S: SiblingSource>(source: &S, parent_id: Uuid) -> Result<(), BackendError> {
        if source.parent_exists(parent_id).await? {
            Ok(())
        } else {
            Err(BackendError::not_found(S::PARENT, parent_id))
        }
    }

    async fn backoff(&self, attempt: u32, reason: &str) -> Result<(), BackendError> {
        if attempt >= self.retries {
            tracing::warn!("[Ordering] Giving up after {} attempts: {}", attempt + 1, reason);
            return Err(BackendError::conflict(format!(
                "concurrent update could not be applied: {}",
                reason
            )));
        }
        tracing::debug!("[Ordering] Retrying after conflict: {}", reason);
        tokio::time::sleep(Duration::from_millis(5 * u64::from(attempt + 1))).await;
        Ok(())
    }

    /// Give `item` the next trailing position under its parent and store it
    pub async fn append<S: SiblingSource>(&self, source: &S, mut item: S::Item) -> Result<S::Item, BackendError> {
        let _scope = self.scopes.lock(item.parent_id()).await;
        Self::require_parent(source, item.parent_id()).await?;
        let siblings = source.siblings(item.parent_id()).await?;
        item.set_position(sequence::next_position(&siblings));
        source.write(std::slice::from_ref(&item), &[]).await?;
        tracing::debug!(
            "[Ordering] Appended {} {} at {}",
            S::ENTITY,
            item.id(),
            item.position()
        );
        Ok(item)
    }

    /// Move an item to `new_position` within its current parent
    pub async fn move_item<S: SiblingSource>(
        &self,
        source: &S,
        item_id: Uuid,
        new_position: i32,
    ) -> Result<MoveOutcome<S::Item>, BackendError> {
        if new_position < 1 {
            return Err(OrderingError::InvalidPosition(new_position).into_backend(S::ENTITY));
        }

        let mut attempt = 0;
        loop {
            let parent_id = Self::require(source, item_id).await?.parent_id();
            let outcome = {
                let _scope = self.scopes.lock(parent_id).await;
                self.move_locked(source, item_id, parent_id, new_position).await?
            };
            match outcome {
                Attempt::Done(outcome) => return Ok(outcome),
                Attempt::Retry(reason) => self.backoff(attempt, &reason).await?,
            }
            attempt += 1;
        }
    }

    async fn move_locked<S: SiblingSource>(
        &self,
        source: &S,
        item_id: Uuid,
        parent_id: Uuid,
        new_position: i32,
    ) -> Result<Attempt<MoveOutcome<S::Item>>, BackendError> {
        let item = Self::require(source, item_id).await?;
        if item.parent_id() != parent_id {
            return Ok(Attempt::Retry(format!("{} changed parent", item_id)));
        }

        let mut siblings = source.siblings(parent_id).await?;
        let plan = match sequence::move_within(&mut siblings, item_id, new_position) {
            Ok(Some(plan)) => plan,
            Ok(None) => return Ok(Attempt::Done(MoveOutcome::Unchanged(item))),
            Err(OrderingError::ItemNotFound(_)) => {
                return Ok(Attempt::Retry(format!("{} missing from siblings", item_id)))
            }
            Err(err) => return Err(err.into_backend(S::ENTITY)),
        };
        if let Err(err) = sequence::verify_dense(&siblings) {
            return Ok(Attempt::Retry(err.to_string()));
        }

        source.write(&pick(&siblings, &plan.changed), &[]).await?;
        sequence::sort_by_position(&mut siblings);
        let moved = siblings
            .iter()
            .find(|s| s.id() == item_id)
            .cloned()
            .unwrap_or(item);

        tracing::debug!(
            "[Ordering] Moved {} {} from {} to {}",
            S::ENTITY,
            item_id,
            plan.old_position,
            plan.new_position
        );
        Ok(Attempt::Done(MoveOutcome::Moved {
            item: moved,
            old_parent: parent_id,
            old_position: plan.old_position,
            new_position: plan.new_position,
            siblings,
        }))
    }

    /// Move an item under `new_parent` at `new_position`, closing the gap
    /// in the old parent. Same-parent requests fall back to `move_item`.
    pub async fn move_across<S: SiblingSource>(
        &self,
        source: &S,
        item_id: Uuid,
        new_parent: Uuid,
        new_position: i32,
    ) -> Result<MoveOutcome<S::Item>, BackendError> {
        if new_position < 1 {
            return Err(OrderingError::InvalidPosition(new_position).into_backend(S::ENTITY));
        }

        let mut attempt = 0;
        loop {
            let old_parent = Self::require(source, item_id).await?.parent_id();
            if old_parent == new_parent {
                return self.move_item(source, item_id, new_position).await;
            }
            let outcome = {
                let _scopes = self.scopes.lock_pair(old_parent, new_parent).await;
                self.move_across_locked(source, item_id, old_parent, new_parent, new_position)
                    .await?
            };
            match outcome {
                Attempt::Done(outcome) => return Ok(outcome),
                Attempt::Retry(reason) => self.backoff(attempt, &reason).await?,
            }
            attempt += 1;
        }
    }

    async fn move_across_locked<S: SiblingSource>(
        &self,
        source: &S,
        item_id: Uuid,
        old_parent: Uuid,
        new_parent: Uuid,
        new_position: i32,
    ) -> Result<Attempt<MoveOutcome<S::Item>>, BackendError> {
        let item = Self::require(source, item_id).await?;
        if item.parent_id() != old_parent {
            return Ok(Attempt::Retry(format!("{} changed parent", item_id)));
        }
        Self::require_parent(source, new_parent).await?;

        let mut source_siblings = source.siblings(old_parent).await?;
        let mut target_siblings = source.siblings(new_parent).await?;

        let (detached, closed) = match sequence::remove_from(&mut source_siblings, item_id) {
            Ok(result) => result,
            Err(err) => return Ok(Attempt::Retry(err.to_string())),
        };
        let old_position = detached.position();
        let (position, opened) =
            sequence::insert_into(&mut target_siblings, new_parent, detached, new_position)
                .map_err(|err| err.into_backend(S::ENTITY))?;

        if let Err(err) = sequence::verify_dense(&source_siblings)
            .and_then(|_| sequence::verify_dense(&target_siblings))
        {
            return Ok(Attempt::Retry(err.to_string()));
        }

        let mut upserts = pick(&source_siblings, &closed);
        let mut moved_ids = opened;
        moved_ids.push(item_id);
        upserts.extend(pick(&target_siblings, &moved_ids));
        source.write(&upserts, &[]).await?;

        let moved = target_siblings
            .iter()
            .find(|s| s.id() == item_id)
            .cloned()
            .unwrap_or(item);

        tracing::debug!(
            "[Ordering] Moved {} {} from {}@{} to {}@{}",
            S::ENTITY,
            item_id,
            old_parent,
            old_position,
            new_parent,
            position
        );
        Ok(Attempt::Done(MoveOutcome::Moved {
            item: moved,
            old_parent,
            old_position,
            new_position: position,
            siblings: target_siblings,
        }))
    }

    /// Delete an item and close the gap it leaves
    pub async fn remove<S: SiblingSource>(&self, source: &S, item_id: Uuid) -> Result<Removal<S::Item>, BackendError> {
        self.remove_scoped(source, item_id, false).await
    }

    /// Delete an item that is itself a parent, together with its children.
    ///
    /// Holds the item's own scope after its parent's, so writes under the
    /// item finish before it goes and none start afterwards.
    pub async fn remove_with_children<S: SiblingSource>(
        &self,
        source: &S,
        item_id: Uuid,
    ) -> Result<Removal<S::Item>, BackendError> {
        self.remove_scoped(source, item_id, true).await
    }

    async fn remove_scoped<S: SiblingSource>(
        &self,
        source: &S,
        item_id: Uuid,
        children: bool,
    ) -> Result<Removal<S::Item>, BackendError> {
        let mut attempt = 0;
        loop {
            let parent_id = Self::require(source, item_id).await?.parent_id();
            let outcome = {
                let _scope = self.scopes.lock(parent_id).await;
                let _children = if children {
                    Some(self.scopes.lock(item_id).await)
                } else {
                    None
                };
                self.remove_locked(source, item_id, parent_id).await?
            };
            match outcome {
                Attempt::Done(removal) => return Ok(removal),
                Attempt::Retry(reason) => self.backoff(attempt, &reason).await?,
            }
            attempt += 1;
        }
    }

    async fn remove_locked<S: SiblingSource>(
        &self,
        source: &S,
        item_id: Uuid,
        parent_id: Uuid,
    ) -> Result<Attempt<Removal<S::Item>>, BackendError> {
        let item = Self::require(source, item_id).await?;
        if item.parent_id() != parent_id {
            return Ok(Attempt::Retry(format!("{} changed parent", item_id)));
        }

        let mut siblings = source.siblings(parent_id).await?;
        let (removed, shifted) = match sequence::remove_from(&mut siblings, item_id) {
            Ok(result) => result,
            Err(err) => return Ok(Attempt::Retry(err.to_string())),
        };
        if let Err(err) = sequence::verify_dense(&siblings) {
            return Ok(Attempt::Retry(err.to_string()));
        }

        source.write(&pick(&siblings, &shifted), &[item_id]).await?;
        tracing::debug!(
            "[Ordering] Removed {} {} from position {}",
            S::ENTITY,
            item_id,
            removed.position()
        );
        Ok(Attempt::Done(Removal {
            item: removed,
            siblings,
        }))
    }

    /// Apply a non-positional edit to an item while its parent's scope is
    /// held, so the write cannot carry a stale position.
    pub async fn update<S, F>(&self, source: &S, item_id: Uuid, mut edit: F) -> Result<S::Item, BackendError>
    where
        S: SiblingSource,
        F: FnMut(&mut S::Item) -> Result<(), BackendError> + Send,
    {
        let mut attempt = 0;
        loop {
            let parent_id = Self::require(source, item_id).await?.parent_id();
            let outcome = {
                let _scope = self.scopes.lock(parent_id).await;
                let mut item = Self::require(source, item_id).await?;
                if item.parent_id() == parent_id {
                    edit(&mut item)?;
                    source.write(std::slice::from_ref(&item), &[]).await?;
                    Attempt::Done(item)
                } else {
                    Attempt::Retry(format!("{} changed parent", item_id))
                }
            };
            match outcome {
                Attempt::Done(item) => return Ok(item),
                Attempt::Retry(reason) => self.backoff(attempt, &reason).await?,
            }
            attempt += 1;
        }
    }

    /// Rewrite the order of every child of `parent_id`
    pub async fn reorder<S: SiblingSource>(
        &self,
        source: &S,
        parent_id: Uuid,
        order: &[Uuid],
    ) -> Result<Vec<S::Item>, BackendError> {
        let _scope = self.scopes.lock(parent_id).await;
        let mut siblings = source.siblings(parent_id).await?;
        let changed = sequence::reorder(&mut siblings, order).map_err(|err| err.into_backend(S::ENTITY))?;
        source.write(&pick(&siblings, &changed), &[]).await?;
        tracing::debug!(
            "[Ordering] Reordered {} children of {} ({} changed)",
            S::ENTITY,
            parent_id,
            changed.len()
        );
        Ok(siblings)
    }
}
