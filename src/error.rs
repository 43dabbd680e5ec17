use axum::{
    extract::{multipart::MultipartError, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Failures that escape a handler. Anything other than a malformed request becomes a bare 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Form(#[from] FormRejection),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Multipart(e) => (e.status(), e.body_text()).into_response(),
            // a missing or malformed urlencoded field is a plain 400, same as multipart fields
            AppError::Form(e) => (StatusCode::BAD_REQUEST, e.body_text()).into_response(),
            AppError::Database(e) => {
                error!(error = %e, "database failure");
                internal_error()
            }
            AppError::Internal(e) => {
                error!(error = ?e, "internal failure");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
