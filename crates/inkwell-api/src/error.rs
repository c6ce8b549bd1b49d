use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

use inkwell_db::StoreError;

use crate::gate::GateError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Anonymous caller on a protected route, or a post that is missing or
    /// not the caller's. Answered with a plain redirect home.
    #[error("request refused")]
    Refused,

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("token signing failed: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),

    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Storage(e) => AppError::Storage(e),
            GateError::Anonymous | GateError::NotFoundOrForbidden => AppError::Refused,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Refused => Redirect::to("/").into_response(),
            other => {
                error!("Request failed: {}", other);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
