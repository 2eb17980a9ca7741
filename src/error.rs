use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::credentials::CredentialError;

/// AppError
///
/// Everything a handler can fail with. Validation problems are not here: those
/// re-render their form with a 200.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("token signing error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// 404 with the message as the body.
    #[error("{0}")]
    NotFound(&'static str),

    /// 401 with the message as the body.
    #[error("{0}")]
    Unauthorized(&'static str),
}

impl AppError {
    pub fn post_not_found() -> Self {
        AppError::NotFound("Post not found")
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// Infrastructure failures are logged in full and answered with a generic page;
/// their details never reach the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) | AppError::Unauthorized(message) => {
                (self.status(), message).into_response()
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>Something went wrong</h1><p>Please try again later.</p>"),
                )
                    .into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
