use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::error::{AuthError, PlaybackError, QueueError, SearchError};

/// Error returned by every API handler.
///
/// Rendered as `{"success": false, "error": "..."}` with a status code
/// derived from the underlying error kind.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Queue(e) | ApiError::Playback(PlaybackError::Queue(e)) => queue_status(e),
            ApiError::Playback(_) => StatusCode::CONFLICT,
            ApiError::Search(SearchError::NoPlayableSource(_)) => StatusCode::NOT_FOUND,
            ApiError::Search(SearchError::NoProvider) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Search(SearchError::InvalidUri(_)) => StatusCode::BAD_REQUEST,
            ApiError::Search(_) => StatusCode::BAD_GATEWAY,
            ApiError::Auth(e) => auth_status(e),
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn queue_status(e: &QueueError) -> StatusCode {
    match e {
        QueueError::QueueFull(_) => StatusCode::CONFLICT,
        QueueError::IndexOutOfRange(_) => StatusCode::BAD_REQUEST,
        QueueError::UnresolvedTrack(_) => StatusCode::UNPROCESSABLE_ENTITY,
        QueueError::Corrupted => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn auth_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::Disabled => StatusCode::NOT_FOUND,
        AuthError::MissingSession | AuthError::InvalidSession(_) | AuthError::Expired => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::StateMismatch => StatusCode::BAD_REQUEST,
        AuthError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::Http(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "request failed: {self}");
        } else {
            tracing::debug!(%status, "request rejected: {self}");
        }

        (
            status,
            Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
