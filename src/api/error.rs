use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::metadata::{ErrorKind, MetadataError};
use crate::services::{EpisodeError, ShowError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    Conflict(String),

    HookRejected(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::HookRejected(msg) => write!(f, "Rejected by hook: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{service} request failed: {message}"),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::HookRejected(msg) => {
                tracing::warn!("Pre-hook rejected request: {}", msg);
                (StatusCode::FAILED_DEPENDENCY, msg.clone())
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::InvalidInput | ErrorKind::NotSupported => {
                Self::ValidationError(err.to_string())
            }
            ErrorKind::Upstream => match err {
                MetadataError::Upstream { service, message } => Self::ExternalApiError {
                    service: service.to_string(),
                    message,
                },
                other => Self::ExternalApiError {
                    service: "upstream".to_string(),
                    message: other.to_string(),
                },
            },
            ErrorKind::HookRejected => Self::HookRejected(err.to_string()),
            ErrorKind::Internal => Self::InternalError(err.to_string()),
        }
    }
}

impl From<ShowError> for ApiError {
    fn from(err: ShowError) -> Self {
        match err {
            ShowError::NotFound(_) => Self::NotFound(err.to_string()),
            ShowError::Validation(msg) => Self::ValidationError(msg),
            ShowError::HookRejected(e) => Self::HookRejected(e.to_string()),
            ShowError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<EpisodeError> for ApiError {
    fn from(err: EpisodeError) -> Self {
        match err {
            EpisodeError::NotFound(_) | EpisodeError::ShowNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            EpisodeError::Validation(msg) => Self::ValidationError(msg),
            EpisodeError::Conflict(msg) => Self::Conflict(msg),
            EpisodeError::HookRejected(e) => Self::HookRejected(e.to_string()),
            EpisodeError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookError;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_metadata_kinds_map_to_status() {
        let cases = [
            (MetadataError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                MetadataError::InvalidInput("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                MetadataError::NotSupported("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (MetadataError::tvdb("boom"), StatusCode::BAD_GATEWAY),
            (
                MetadataError::HookRejected(HookError::Status(500)),
                StatusCode::FAILED_DEPENDENCY,
            ),
            (
                MetadataError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(status_of(err.into()), expected);
        }
    }

    #[test]
    fn test_episode_conflict_is_409() {
        let err: ApiError = EpisodeError::Conflict("dup".into()).into();
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_service_errors_map_to_status() {
        assert_eq!(
            status_of(ApiError::validation("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ShowError::NotFound("x".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(anyhow::anyhow!("disk gone").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
