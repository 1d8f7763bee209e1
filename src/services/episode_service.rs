//! Domain service for stored episodes.
//!
//! Mirrors [`crate::services::ShowService`] with `episode.<op>.*` hooks. A
//! duplicate `(show, season, episode)` is a [`EpisodeError::Conflict`] here;
//! only the enqueue workflow treats duplicates as no-ops.

use crate::hooks::HookError;
use crate::models::{EpisodeInput, StoredEpisode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EpisodeError {
    #[error("Episode {0} not found")]
    NotFound(String),

    #[error("Show {0} not found")]
    ShowNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rejected by hook: {0}")]
    HookRejected(#[from] HookError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for EpisodeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EpisodeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for EpisodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Database(format!("payload encoding failed: {err}"))
    }
}

#[async_trait::async_trait]
pub trait EpisodeService: Send + Sync {
    /// Stores a new episode under an existing show.
    ///
    /// # Errors
    ///
    /// - [`EpisodeError::ShowNotFound`] if `show_id` is unknown
    /// - [`EpisodeError::Conflict`] if the show already has that season/episode
    /// - [`EpisodeError::HookRejected`] if `episode.create.pre` fails
    async fn create(&self, input: EpisodeInput) -> Result<StoredEpisode, EpisodeError>;

    async fn list(&self, show_id: Option<&str>) -> Result<Vec<StoredEpisode>, EpisodeError>;

    async fn get(&self, id: &str) -> Result<StoredEpisode, EpisodeError>;

    async fn update(&self, id: &str, input: EpisodeInput)
    -> Result<StoredEpisode, EpisodeError>;

    async fn delete(&self, id: &str) -> Result<(), EpisodeError>;
}
