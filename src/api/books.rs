//! Book endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{AppResult, ErrorResponse},
    models::book::{Book, BooksResponse, CreateBook, MessageResponse, PageQuery, UpdateBook},
};

use super::{
    extract::{Params, PathId, Payload},
    AuthenticatedUser,
};

/// Add a new book
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    security(("basic_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book successfully created", body = Book),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(username): AuthenticatedUser,
    Payload(data): Payload<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    tracing::debug!(user = %username, "Creating book");
    let book = state.services.books.create(&data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// List books, one page at a time
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "List of books with pagination info", body = BooksResponse),
        (status = 422, description = "Invalid paging parameters", body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Params(query): Params<PageQuery>,
) -> AppResult<Json<BooksResponse>> {
    let response = state.services.books.list(&query).await?;
    Ok(Json(response))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/api/books/{book_id}",
    tag = "books",
    params(("book_id" = i64, Path, description = "Unique identifier of the book")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    PathId(id): PathId<i64>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Update an existing book; only the supplied fields change
#[utoipa::path(
    put,
    path = "/api/books/{book_id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(("book_id" = i64, Path, description = "Unique identifier of the book")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book successfully updated", body = Book),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(username): AuthenticatedUser,
    PathId(id): PathId<i64>,
    Payload(data): Payload<UpdateBook>,
) -> AppResult<Json<Book>> {
    tracing::debug!(user = %username, book_id = id, "Updating book");
    let book = state.services.books.update(id, &data).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/books/{book_id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(("book_id" = i64, Path, description = "Unique identifier of the book")),
    responses(
        (status = 200, description = "Book successfully deleted", body = MessageResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(username): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<Json<MessageResponse>> {
    tracing::debug!(user = %username, book_id = id, "Deleting book");
    state.services.books.delete(id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Book with id {} was successfully deleted",
        id
    ))))
}
