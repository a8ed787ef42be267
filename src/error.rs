use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::ports::RepositoryError;
use crate::validation::ValidationError;

const INTERNAL_ERROR_TITLE: &str = "Internal server error";

/// Underlying text of a 5xx error, attached to the response so that
/// [`expose_error_detail`] can surface it in development.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Constraint(validation) => AppError::Validation(validation),
            RepositoryError::Duplicate(field) => {
                AppError::Conflict(format!("{} is already in use", field))
            }
            RepositoryError::Corrupt(detail) => AppError::DatabaseError(detail),
            RepositoryError::Database(e) => AppError::Database(e),
        }
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Short title and human message for the response body.
    fn parts(&self) -> (&'static str, String) {
        match self {
            AppError::Validation(e) => (e.kind.title(), e.message.clone()),
            AppError::NotFound(msg) => ("Not found", msg.clone()),
            AppError::Conflict(msg) => ("Conflict", msg.clone()),
            AppError::BadRequest(msg) => ("Bad request", msg.clone()),
            AppError::Unauthorized(msg) => ("Unauthorized", msg.clone()),
            AppError::Forbidden(msg) => ("Forbidden", msg.clone()),
            AppError::Database(_) | AppError::DatabaseError(_) | AppError::Internal(_) => {
                (INTERNAL_ERROR_TITLE, "Something went wrong".to_string())
            }
        }
    }
}

fn error_body(status: StatusCode, error: &str, message: &str) -> Response {
    let body = Json(json!({
        "success": false,
        "error": error,
        "message": message,
    }));

    (status, body).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let (error, message) = self.parts();
        let mut response = error_body(status, error, &message);
        if status.is_server_error() {
            response
                .extensions_mut()
                .insert(InternalErrorDetail(self.to_string()));
        }

        response
    }
}

/// Rewrites 5xx bodies with the underlying error text when `expose` is set.
pub async fn expose_error_detail(State(expose): State<bool>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if !expose {
        return response;
    }

    match response.extensions().get::<InternalErrorDetail>().cloned() {
        Some(InternalErrorDetail(detail)) => {
            error_body(response.status(), INTERNAL_ERROR_TITLE, &detail)
        }
        None => response,
    }
}
