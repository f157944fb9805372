//! Repository layer for database operations

pub mod books;

use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};

pub use books::{BookRepository, SqliteBookRepository};

use crate::{config::DatabaseConfig, error::AppResult};

const BUSY_TIMEOUT_SECS: u64 = 10;

/// Main repository struct holding the per-table stores
#[derive(Clone)]
pub struct Repository {
    pub books: SqliteBookRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            books: SqliteBookRepository::new(pool),
        }
    }

    /// Open the database (creating the file if needed) and bring the schema up to date
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        // writers queue on the busy timeout; WAL keeps readers off the write lock
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!("Database migrations completed");

        Ok(Self::new(pool))
    }
}
