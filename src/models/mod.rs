//! Data models for the Book Management API

pub mod book;

// Re-export commonly used types
pub use book::{Book, BooksResponse, CreateBook, MessageResponse, Page, PageQuery, UpdateBook};
