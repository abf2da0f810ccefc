//! PostgreSQL document store
//!
//! Every entity lives in the `documents` table as a JSONB body keyed by
//! `(kind, id)`. Ordered kinds also fill `parent_id` and `position`, which is
//! what sibling queries sort on.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::backend::store::{Document, DocumentStore, StoreResult};
use crate::shared::{Board, Column, Task};

/// Document store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn get<D: Document>(&self, id: Uuid) -> StoreResult<Option<D>> {
        let row = sqlx::query("SELECT body FROM documents WHERE kind = $1 AND id = $2")
            .bind(D::KIND)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(decode(row.get("body"))?)),
            None => Ok(None),
        }
    }

    async fn children<D: Document>(&self, parent_id: Uuid) -> StoreResult<Vec<D>> {
        let rows = sqlx::query(
            r#"
            SELECT body FROM documents
            WHERE kind = $1 AND parent_id = $2
            ORDER BY position ASC
            "#,
        )
        .bind(D::KIND)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| decode(row.get("body"))).collect()
    }
}

fn decode<D: Document>(body: serde_json::Value) -> StoreResult<D> {
    Ok(serde_json::from_value(body)?)
}

async fn upsert<D: Document>(tx: &mut Transaction<'_, Postgres>, doc: &D) -> StoreResult<()> {
    let body = serde_json::to_value(doc)?;
    sqlx::query(
        r#"
        INSERT INTO documents (kind, id, parent_id, position, body, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        ON CONFLICT (kind, id) DO UPDATE
        SET parent_id = EXCLUDED.parent_id,
            position = EXCLUDED.position,
            body = EXCLUDED.body,
            updated_at = NOW()
        "#,
    )
    .bind(D::KIND)
    .bind(doc.id())
    .bind(doc.parent_id())
    .bind(doc.position())
    .bind(body)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn remove_columns(tx: &mut Transaction<'_, Postgres>, column_ids: &[Uuid]) -> StoreResult<()> {
    if column_ids.is_empty() {
        return Ok(());
    }
    sqlx::query("DELETE FROM documents WHERE kind = $1 AND parent_id = ANY($2)")
        .bind(Task::KIND)
        .bind(column_ids)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM documents WHERE kind = $1 AND id = ANY($2)")
        .bind(Column::KIND)
        .bind(column_ids)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.get(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT body FROM documents WHERE kind = $1 AND body->>'email' = $2")
            .bind(User::KIND)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(decode(row.get("body"))?)),
            None => Ok(None),
        }
    }

    async fn put_user(&self, user: &User) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        upsert(&mut tx, user).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_board(&self, id: Uuid) -> StoreResult<Option<Board>> {
        self.get(id).await
    }

    async fn boards_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Board>> {
        let rows = sqlx::query(
            r#"
            SELECT body FROM documents
            WHERE kind = $1
              AND (body->>'createdBy' = $2 OR jsonb_exists(body->'members', $2))
            ORDER BY body->>'createdAt' ASC
            "#,
        )
        .bind(Board::KIND)
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| decode(row.get("body"))).collect()
    }

    async fn put_board(&self, board: &Board) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        upsert(&mut tx, board).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_board(&self, id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let column_ids: Vec<Uuid> =
            sqlx::query("SELECT id FROM documents WHERE kind = $1 AND parent_id = $2")
                .bind(Column::KIND)
                .bind(id)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .map(|row| row.get("id"))
                .collect();
        remove_columns(&mut tx, &column_ids).await?;
        sqlx::query("DELETE FROM documents WHERE kind = $1 AND id = $2")
            .bind(Board::KIND)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_column(&self, id: Uuid) -> StoreResult<Option<Column>> {
        self.get(id).await
    }

    async fn columns_for_board(&self, board_id: Uuid) -> StoreResult<Vec<Column>> {
        self.children(board_id).await
    }

    async fn write_columns(&self, upserts: &[Column], removals: &[Uuid]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        remove_columns(&mut tx, removals).await?;
        for column in upserts {
            upsert(&mut tx, column).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        self.get(id).await
    }

    async fn tasks_for_column(&self, column_id: Uuid) -> StoreResult<Vec<Task>> {
        self.children(column_id).await
    }

    async fn write_tasks(&self, upserts: &[Task], removals: &[Uuid]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        if !removals.is_empty() {
            sqlx::query("DELETE FROM documents WHERE kind = $1 AND id = ANY($2)")
                .bind(Task::KIND)
                .bind(removals)
                .execute(&mut *tx)
                .await?;
        }
        for task in upserts {
            upsert(&mut tx, task).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
