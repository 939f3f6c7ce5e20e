//! REST routes for files, notes and login.

pub mod auth;
pub mod files;
pub mod notes;

use axum::{
    Router,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::host::HostState;
use crate::store::{FileStoreError, NoteStoreError};

/// Errors surfaced by the REST handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The access gate refused the request.
    #[error("Unauthorized")]
    Unauthorized,
    /// The request was well-formed HTTP but semantically invalid.
    #[error("{0}")]
    BadRequest(String),
    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),
    /// File store failure.
    #[error(transparent)]
    Files(#[from] FileStoreError),
    /// Notes store failure.
    #[error(transparent)]
    Notes(#[from] NoteStoreError),
    /// Malformed multipart body.
    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_)
            | Self::Files(FileStoreError::InvalidName(_))
            | Self::Notes(
                NoteStoreError::EmptyContent
                | NoteStoreError::EmptyName
                | NoteStoreError::UnknownFolder(_),
            ) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::Files(FileStoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Multipart(e) => e.status(),
            Self::Files(FileStoreError::Io(_)) | Self::Notes(NoteStoreError::Database(_)) => {
                error!(error = %self, "Request failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}

/// Router with every REST route, sharing `state`.
pub fn api_router(state: Arc<HostState>) -> Router {
    files::router(state.clone())
        .merge(notes::router(state.clone()))
        .merge(auth::router(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(ApiError::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(FileStoreError::NotFound("x".into())).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(NoteStoreError::EmptyContent).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FileStoreError::Io(std::io::Error::other("disk"))).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
