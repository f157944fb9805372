//! Request extractors whose rejections render as `{"detail": ...}` errors

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult, FieldError};

/// JSON body; malformed or mistyped payloads become 422 validation errors
/// located at the offending field
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(AppError::Validation(vec![FieldError::new(
                &["body"],
                "Expected request with `Content-Type: application/json`",
                "value_error.content_type",
            )]));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            AppError::Validation(vec![FieldError::new(
                &["body"],
                rejection.body_text(),
                "value_error",
            )])
        })?;

        decode(&bytes).map(Payload)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> AppResult<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| AppError::from_body(Some(e.path()), e.inner()))?;
    deserializer
        .end()
        .map_err(|e| AppError::from_body(None, &e))?;
    Ok(value)
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Query string parameters
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Params<T>(pub T);

/// Path segments
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathId<T>(pub T);
