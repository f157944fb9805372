//! Book model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult, FieldError};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Unique identifier, assigned on creation
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "The Great Gatsby")]
    pub title: String,
    #[schema(example = "F. Scott Fitzgerald")]
    pub author: String,
    /// Publication date (YYYY-MM-DD)
    #[schema(value_type = String, format = Date, example = "1925-04-10")]
    pub published_date: NaiveDate,
    #[schema(example = 180)]
    pub number_of_pages: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    #[schema(example = "1984")]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "author must be 1-100 characters"))]
    #[schema(example = "George Orwell")]
    pub author: String,
    #[schema(value_type = String, format = Date, example = "1949-06-08")]
    pub published_date: NaiveDate,
    #[validate(range(min = 1, message = "number_of_pages must be greater than 0"))]
    #[schema(example = 328)]
    pub number_of_pages: i32,
}

/// Update book request. Absent (or null) fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    #[schema(example = "1984 - Anniversary Edition")]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "author must be 1-100 characters"))]
    pub author: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub published_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "number_of_pages must be greater than 0"))]
    pub number_of_pages: Option<i32>,
}

impl UpdateBook {
    /// Apply the supplied fields on top of an existing record
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(published_date) = self.published_date {
            book.published_date = published_date;
        }
        if let Some(number_of_pages) = self.number_of_pages {
            book.number_of_pages = number_of_pages;
        }
    }
}

/// Pagination query for the book listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting from 1 (default: 1)
    pub page: Option<i64>,
    /// Books per page, 1-100 (default: 10)
    pub page_size: Option<i64>,
}

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Lenient constructor: out-of-range values are pulled back into bounds
    pub fn clamped(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total` rows; never less than 1
    pub fn total_pages(&self, total: i64) -> i64 {
        ((total + self.page_size - 1) / self.page_size).max(1)
    }
}

impl PageQuery {
    /// Reject non-positive values; oversized pages are clamped to the maximum
    pub fn validate(&self) -> AppResult<Page> {
        let mut details = Vec::new();
        let page = self.page.unwrap_or(1);
        if page < 1 {
            details.push(FieldError::new(
                &["query", "page"],
                "page must be greater than or equal to 1",
                "value_error.number.not_ge",
            ));
        }
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size < 1 {
            details.push(FieldError::new(
                &["query", "page_size"],
                "page_size must be greater than or equal to 1",
                "value_error.number.not_ge",
            ));
        }
        if !details.is_empty() {
            return Err(AppError::Validation(details));
        }
        Ok(Page::clamped(page, page_size))
    }
}

/// Paginated listing response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BooksResponse {
    pub books: Vec<Book>,
    /// Total number of books in the store
    #[schema(example = 25)]
    pub total: i64,
    #[schema(example = 1)]
    pub page: i64,
    #[schema(example = 10)]
    pub page_size: i64,
    #[schema(example = 3)]
    pub total_pages: i64,
}

impl BooksResponse {
    pub fn new(books: Vec<Book>, total: i64, page: Page) -> Self {
        Self {
            books,
            total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages(total),
        }
    }
}

/// Plain message response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Operation completed successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
