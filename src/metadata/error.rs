use crate::hooks::HookError;
use thiserror::Error;

/// Classification carried by every [`MetadataError`].
///
/// The HTTP boundary maps on this tag; message text is for humans only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    NotSupported,
    Upstream,
    HookRejected,
    Internal,
}

impl ErrorKind {
    /// Whether the caller can fix the request and retry.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound | Self::InvalidInput | Self::NotSupported)
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotSupported(String),

    #[error("{service} request failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("pre-hook rejected the operation: {0}")]
    HookRejected(#[from] HookError),

    #[error("{0}")]
    Internal(String),
}

impl MetadataError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::HookRejected(_) => ErrorKind::HookRejected,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }

    pub fn anilist(message: impl Into<String>) -> Self {
        Self::upstream("anilist", message)
    }

    pub fn tvdb(message: impl Into<String>) -> Self {
        Self::upstream("tvdb", message)
    }
}

impl From<reqwest::Error> for MetadataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Internal(format!("failed to decode upstream response: {err}"));
        }
        Self::upstream("http", err.to_string())
    }
}

impl From<serde_json::Error> for MetadataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("json error: {err}"))
    }
}

impl From<sea_orm::DbErr> for MetadataError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Internal(format!("database error: {err}"))
    }
}

impl From<anyhow::Error> for MetadataError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<url::ParseError> for MetadataError {
    fn from(err: url::ParseError) -> Self {
        Self::Internal(format!("invalid upstream url: {err}"))
    }
}
