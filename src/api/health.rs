//! Welcome and health check endpoints

use axum::Json;

use crate::models::MessageResponse;

/// Welcome message
#[utoipa::path(
    get,
    path = "/",
    tag = "info",
    responses(
        (status = 200, description = "Welcome message", body = MessageResponse)
    )
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "Welcome to the Book Management API! Visit /docs for API documentation.",
    ))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "API is healthy and running", body = MessageResponse)
    )
)]
pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse::new("API is healthy"))
}
