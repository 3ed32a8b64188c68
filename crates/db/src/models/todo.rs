use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_with::{BoolFromInt, serde_as};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

/// A single to-do record. `completed` travels as `0`/`1` on the wire.
#[serde_as]
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub category: String,
    #[serde_as(as = "BoolFromInt")]
    #[ts(type = "number")]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct CreateTodo {
    pub text: String,
    pub category: String,
}

impl CreateTodo {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct BulkUpdateTodos {
    pub ids: Vec<i64>,
    pub completed: bool,
}

/// Result of a batched completion update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkUpdateOutcome {
    Updated(Vec<Todo>),
    /// Nothing was written because this id does not exist.
    Missing(i64),
}

const TODO_COLUMNS: &str = "id, text, category, completed";

impl Todo {
    /// Newest first, optionally restricted to one category.
    pub async fn find_all(
        pool: &SqlitePool,
        category: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match category {
            Some(category) => {
                sqlx::query_as::<_, Todo>(&format!(
                    "SELECT {TODO_COLUMNS} FROM todos WHERE category = $1 ORDER BY id DESC"
                ))
                .bind(category)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Todo>(&format!(
                    "SELECT {TODO_COLUMNS} FROM todos ORDER BY id DESC"
                ))
                .fetch_all(pool)
                .await
            }
        }
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Todo>(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn count_incomplete_in_category(
        pool: &SqlitePool,
        category: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE category = $1 AND completed = 0")
            .bind(category)
            .fetch_one(pool)
            .await
    }

    /// Plain insert. Quota and category checks belong to the caller.
    pub async fn create(pool: &SqlitePool, data: &CreateTodo) -> Result<Self, sqlx::Error> {
        let result = sqlx::query("INSERT INTO todos (text, category, completed) VALUES ($1, $2, 0)")
            .bind(&data.text)
            .bind(&data.category)
            .execute(pool)
            .await?;

        Self::find_by_id(pool, result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Number of rows changed; zero means the id is unknown.
    pub async fn update_completion<'e, E>(
        executor: E,
        id: i64,
        completed: bool,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE todos SET completed = $2 WHERE id = $1")
            .bind(id)
            .bind(completed)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Set `completed` on every id in one transaction. If any id is unknown
    /// the transaction is rolled back and nothing changes.
    pub async fn bulk_update_completion(
        pool: &SqlitePool,
        ids: &[i64],
        completed: bool,
    ) -> Result<BulkUpdateOutcome, sqlx::Error> {
        let ids: BTreeSet<i64> = ids.iter().copied().collect();
        let mut tx = pool.begin().await?;

        for &id in &ids {
            if Self::update_completion(&mut *tx, id, completed).await? == 0 {
                tx.rollback().await?;
                return Ok(BulkUpdateOutcome::Missing(id));
            }
        }

        let mut updated = Vec::with_capacity(ids.len());
        for &id in ids.iter().rev() {
            if let Some(todo) = Self::find_by_id(&mut *tx, id).await? {
                updated.push(todo);
            }
        }

        tx.commit().await?;
        Ok(BulkUpdateOutcome::Updated(updated))
    }
}
