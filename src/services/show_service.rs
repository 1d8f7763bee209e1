//! Domain service for stored shows.
//!
//! Every write fires the matching `show.<op>.pre` hook first and
//! `show.<op>.post` once the write has landed.

use crate::hooks::HookError;
use crate::models::{Show, StoredShow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShowError {
    #[error("Show {0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rejected by hook: {0}")]
    HookRejected(#[from] HookError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ShowError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ShowError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for ShowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Database(format!("payload encoding failed: {err}"))
    }
}

#[async_trait::async_trait]
pub trait ShowService: Send + Sync {
    /// Stores a new show.
    ///
    /// # Errors
    ///
    /// - [`ShowError::HookRejected`] if `show.create.pre` fails; nothing is written
    /// - [`ShowError::Database`] on storage failures
    async fn create(&self, show: Show) -> Result<StoredShow, ShowError>;

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<StoredShow>, ShowError>;

    async fn get(&self, id: &str) -> Result<StoredShow, ShowError>;

    /// Replaces every field of a stored show.
    ///
    /// # Errors
    ///
    /// - [`ShowError::NotFound`] if the id is unknown
    /// - [`ShowError::HookRejected`] if `show.update.pre` fails
    async fn update(&self, id: &str, show: Show) -> Result<StoredShow, ShowError>;

    /// Deletes a show together with its episodes and jobs.
    async fn delete(&self, id: &str) -> Result<(), ShowError>;
}
