//! Lifecycle webhooks.
//!
//! Every mutating operation fires a `*.pre` event before it writes and a
//! `*.post` event after. A failed pre-hook aborts the operation; a failed
//! post-hook is only logged.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use http::HttpDispatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HookEvent {
    ShowCreatePre,
    ShowCreatePost,
    ShowUpdatePre,
    ShowUpdatePost,
    ShowDeletePre,
    ShowDeletePost,
    EpisodeCreatePre,
    EpisodeCreatePost,
    EpisodeUpdatePre,
    EpisodeUpdatePost,
    EpisodeDeletePre,
    EpisodeDeletePost,
}

impl HookEvent {
    pub const ALL: [Self; 12] = [
        Self::ShowCreatePre,
        Self::ShowCreatePost,
        Self::ShowUpdatePre,
        Self::ShowUpdatePost,
        Self::ShowDeletePre,
        Self::ShowDeletePost,
        Self::EpisodeCreatePre,
        Self::EpisodeCreatePost,
        Self::EpisodeUpdatePre,
        Self::EpisodeUpdatePost,
        Self::EpisodeDeletePre,
        Self::EpisodeDeletePost,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ShowCreatePre => "show.create.pre",
            Self::ShowCreatePost => "show.create.post",
            Self::ShowUpdatePre => "show.update.pre",
            Self::ShowUpdatePost => "show.update.post",
            Self::ShowDeletePre => "show.delete.pre",
            Self::ShowDeletePost => "show.delete.post",
            Self::EpisodeCreatePre => "episode.create.pre",
            Self::EpisodeCreatePost => "episode.create.post",
            Self::EpisodeUpdatePre => "episode.update.pre",
            Self::EpisodeUpdatePost => "episode.update.post",
            Self::EpisodeDeletePre => "episode.delete.pre",
            Self::EpisodeDeletePost => "episode.delete.post",
        }
    }

    /// Every event name, sorted.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<_> = Self::ALL.iter().map(Self::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == value)
            .ok_or_else(|| HookError::InvalidEvent(value.to_string()))
    }
}

impl TryFrom<String> for HookEvent {
    type Error = HookError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HookEvent> for String {
    fn from(event: HookEvent) -> Self {
        event.as_str().to_string()
    }
}

#[derive(Debug, Error)]
pub enum HookError {
    #[error("invalid hook event: {0}")]
    InvalidEvent(String),

    #[error("hook settings unavailable: {0}")]
    Store(String),

    #[error("hook delivery failed: {0}")]
    Transport(String),

    #[error("hook endpoint returned status {0}")]
    Status(u16),

    #[error("failed to encode hook payload: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

#[async_trait]
pub trait HookDispatcher: Send + Sync {
    /// Delivers a vetoing notification. An error means the caller must not
    /// perform the mutation.
    async fn dispatch_pre(&self, event: HookEvent, payload: &serde_json::Value)
    -> Result<(), HookError>;

    /// Delivers a best-effort notification after a committed mutation.
    async fn dispatch_post(&self, event: HookEvent, payload: &serde_json::Value);
}

/// Dispatcher that accepts every event and delivers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDispatcher;

#[async_trait]
impl HookDispatcher for NoopDispatcher {
    async fn dispatch_pre(&self, _: HookEvent, _: &serde_json::Value) -> Result<(), HookError> {
        Ok(())
    }

    async fn dispatch_post(&self, _: HookEvent, _: &serde_json::Value) {}
}
