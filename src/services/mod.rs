//! Business logic services

pub mod auth;
pub mod books;

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    error::AppResult,
    repository::{BookRepository, Repository},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: &AuthConfig) -> AppResult<Self> {
        Ok(Self::with_book_repository(
            Arc::new(repository.books),
            auth::AuthService::from_config(auth_config)?,
        ))
    }

    /// Wire services around an arbitrary book store
    pub fn with_book_repository(books: Arc<dyn BookRepository>, auth: auth::AuthService) -> Self {
        Self {
            auth,
            books: books::BooksService::new(books),
        }
    }
}
