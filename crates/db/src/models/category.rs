use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct Category {
    pub name: String,
}

impl Category {
    /// All categories in seed order.
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT name FROM categories ORDER BY rowid ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn exists(pool: &SqlitePool, name: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE name = $1")
            .bind(name)
            .fetch_one(pool)
            .await?;
        Ok(count > 0)
    }

    /// Insert `name` unless it is already present.
    pub async fn seed(pool: &SqlitePool, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO categories (name) VALUES ($1)")
            .bind(name)
            .execute(pool)
            .await?;
        Ok(())
    }
}
