//! Error types for the Book Management API

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::error::Category;
use serde_path_to_error::{Path, Segment};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

/// One entry of a validation failure, pointing at the offending input.
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct FieldError {
    /// Location of the input, e.g. `["body", "title"]`
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn book_not_found(id: i64) -> Self {
        AppError::NotFound(format!("Book with id {} not found", id))
    }

    /// Build a validation error from `validator` output, locating each field under `location`
    pub fn from_validation(location: &str, errors: &ValidationErrors) -> Self {
        let mut details = Vec::new();
        for (field, kind) in errors.errors() {
            let field = field.to_string();
            if let ValidationErrorsKind::Field(field_errors) = kind {
                for error in field_errors {
                    let msg = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for {}", field));
                    details.push(FieldError::new(
                        &[location, field.as_str()],
                        msg,
                        format!("value_error.{}", error.code),
                    ));
                }
            }
        }
        // HashMap iteration order is arbitrary
        details.sort_by(|a, b| a.loc.cmp(&b.loc));
        AppError::Validation(details)
    }

    /// Build a validation error from a JSON body that failed to decode.
    ///
    /// Data errors are located at the field `path` points to; a missing field is
    /// reported at the field itself. Syntax errors point at the body as a whole.
    pub fn from_body(path: Option<&Path>, error: &serde_json::Error) -> Self {
        let mut loc = vec!["body".to_string()];

        let detail = match error.classify() {
            Category::Data => {
                if let Some(path) = path {
                    loc.extend(path.iter().filter_map(|segment| match segment {
                        Segment::Map { key } => Some(key.clone()),
                        Segment::Seq { index } => Some(index.to_string()),
                        Segment::Enum { variant } => Some(variant.clone()),
                        _ => None,
                    }));
                }
                match missing_field(error) {
                    Some(field) => {
                        loc.push(field);
                        FieldError {
                            loc,
                            msg: "field required".to_string(),
                            kind: "value_error.missing".to_string(),
                        }
                    }
                    None => FieldError {
                        loc,
                        msg: error.to_string(),
                        kind: "type_error".to_string(),
                    },
                }
            }
            Category::Syntax | Category::Eof | Category::Io => FieldError {
                loc,
                msg: error.to_string(),
                kind: "value_error.jsondecode".to_string(),
            },
        };

        AppError::Validation(vec![detail])
    }
}

/// Field name out of serde's "missing field `name`" message
fn missing_field(error: &serde_json::Error) -> Option<String> {
    let msg = error.to_string();
    let rest = msg.strip_prefix("missing field `")?;
    rest.split('`').next().map(str::to_string)
}

/// Error response body.
///
/// `detail` is a message string, or a list of [`FieldError`] for validation failures.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(value_type = Object)]
    pub detail: serde_json::Value,
}

impl ErrorResponse {
    fn message(msg: impl Into<String>) -> Self {
        Self {
            detail: serde_json::Value::String(msg.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Authentication(msg) => {
                tracing::warn!("Rejected credentials: {}", msg);
                let body = Json(ErrorResponse::message("Invalid credentials"));
                let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
                return response;
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::message(msg)),
            AppError::Validation(details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    detail: serde_json::to_value(details).unwrap_or_default(),
                },
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Internal server error"),
                )
            }
            AppError::Migration(e) => {
                tracing::error!("Migration error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Internal server error"),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(vec![FieldError::new(
            &["query"],
            rejection.body_text(),
            "type_error",
        )])
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(vec![FieldError::new(
            &["path", "book_id"],
            rejection.body_text(),
            "type_error.integer",
        )])
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
