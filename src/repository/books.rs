//! Books repository for database operations

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, Page, UpdateBook},
};

/// Persistence operations on book records.
///
/// Implementations own the canonical rows; nothing else mutates them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a new book; the store assigns the id and both timestamps
    async fn create(&self, data: &CreateBook) -> AppResult<Book>;

    async fn get(&self, id: i64) -> AppResult<Book>;

    /// One page of books in ascending id order, plus the total row count
    async fn list(&self, page: Page) -> AppResult<(Vec<Book>, i64)>;

    /// Overwrite the supplied fields and refresh `updated_at`
    async fn update(&self, id: i64, data: &UpdateBook) -> AppResult<Book>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[derive(Clone)]
pub struct SqliteBookRepository {
    pool: Pool<Sqlite>,
}

impl SqliteBookRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Read-modify-write of one row; the caller holds the write lock
    async fn update_locked(
        conn: &mut SqliteConnection,
        id: i64,
        data: &UpdateBook,
    ) -> AppResult<Book> {
        let mut book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::book_not_found(id))?;

        data.apply_to(&mut book);
        // updated_at must move strictly forward even if the clock has not
        book.updated_at = Utc::now().max(book.updated_at + Duration::microseconds(1));

        let row = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = ?1, author = ?2, published_date = ?3, number_of_pages = ?4, updated_at = ?5
            WHERE id = ?6
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.published_date)
        .bind(book.number_of_pages)
        .bind(book.updated_at)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, published_date, number_of_pages, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(data.published_date)
        .bind(data.number_of_pages)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::book_not_found(id))
    }

    async fn list(&self, page: Page) -> AppResult<(Vec<Book>, i64)> {
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&mut *tx)
            .await?;

        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        )
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((books, total))
    }

    async fn update(&self, id: i64, data: &UpdateBook) -> AppResult<Book> {
        let mut conn = self.pool.acquire().await?;

        // take the write lock before reading, a deferred transaction cannot upgrade under contention
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = match Self::update_locked(&mut conn, id, data).await {
            Ok(book) => sqlx::query("COMMIT")
                .execute(&mut *conn)
                .await
                .map(|_| book)
                .map_err(AppError::from),
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                tracing::error!("Rollback of book {} update failed: {}", id, e);
                // do not return a connection with an open transaction to the pool
                drop(conn.detach());
            }
        }

        result
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::book_not_found(id));
        }
        Ok(())
    }
}
