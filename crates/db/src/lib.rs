use std::{path::Path, str::FromStr};

use sqlx::{
    Error, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::info;

pub mod models;

use models::category::Category;

/// Categories present in every freshly initialised store, in display order.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Work", "Personal", "Shopping", "Health"];

const CREATE_CATEGORIES_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS categories (
    name TEXT PRIMARY KEY
)"#;

const CREATE_TODOS_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS todos (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    text      TEXT NOT NULL,
    category  TEXT NOT NULL,
    completed INTEGER DEFAULT 0,
    FOREIGN KEY (category) REFERENCES categories(name)
)"#;

#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    /// Open (or create) the database file at `db_path` and make sure the
    /// schema and default categories exist.
    pub async fn new(db_path: &Path) -> Result<DBService, Error> {
        utils::assets::ensure_parent_dir(db_path);

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let db = DBService { pool };
        db.initialize().await?;
        info!(path = %db_path.display(), "Database initialized");
        Ok(db)
    }

    /// Single-connection in-memory store. The pool keeps its only connection
    /// alive forever, otherwise the database would vanish with it.
    pub async fn new_in_memory() -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = DBService { pool };
        db.initialize().await?;
        Ok(db)
    }

    async fn initialize(&self) -> Result<(), Error> {
        sqlx::query(CREATE_CATEGORIES_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_TODOS_TABLE).execute(&self.pool).await?;

        for name in DEFAULT_CATEGORIES {
            Category::seed(&self.pool, name).await?;
        }
        Ok(())
    }
}
