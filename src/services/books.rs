//! Book catalog service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BooksResponse, CreateBook, PageQuery, UpdateBook},
    repository::BookRepository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Arc<dyn BookRepository>,
}

impl BooksService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    /// Validate and create a new book
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        data.validate()
            .map_err(|e| AppError::from_validation("body", &e))?;
        let book = self.repository.create(data).await?;
        tracing::info!(book_id = book.id, title = %book.title, "Book created");
        Ok(book)
    }

    pub async fn get(&self, id: i64) -> AppResult<Book> {
        self.repository.get(id).await
    }

    /// List one page of books along with paging metadata
    pub async fn list(&self, query: &PageQuery) -> AppResult<BooksResponse> {
        let page = query.validate()?;
        let (books, total) = self.repository.list(page).await?;
        Ok(BooksResponse::new(books, total, page))
    }

    /// Validate and apply a partial update
    pub async fn update(&self, id: i64, data: &UpdateBook) -> AppResult<Book> {
        data.validate()
            .map_err(|e| AppError::from_validation("body", &e))?;
        let book = self.repository.update(id, data).await?;
        tracing::info!(book_id = book.id, "Book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }
}
