//! Domain primitives shared by the metadata core, the job workflow and the
//! CRUD services.
//!
//! Closed vocabularies (provider names, show types, show statuses) are enums
//! rather than strings so that an unknown upstream value can only enter the
//! system through one of the explicit normalization functions below.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External metadata source.
///
/// `AniDb` is accepted for compatibility and is served by the `AniList`
/// adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    AniDb,
    AniList,
    Tvdb,
}

impl ProviderName {
    pub const ALL: [Self; 3] = [Self::AniDb, Self::AniList, Self::Tvdb];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AniDb => "anidb",
            Self::AniList => "anilist",
            Self::Tvdb => "tvdb",
        }
    }

    /// Prefix used in external ids, including the trailing colon.
    #[must_use]
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            Self::AniDb => "anidb:",
            Self::AniList => "anilist:",
            Self::Tvdb => "tvdb:",
        }
    }

    /// Resolves the provider that owns a prefixed external id.
    ///
    /// Returns `None` when the id carries no recognized prefix.
    #[must_use]
    pub fn from_external_id(external_id: &str) -> Option<Self> {
        let value = external_id.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|provider| value.starts_with(provider.id_prefix()))
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type must be one of anidb|anilist|tvdb, got {:?}", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for ProviderName {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anidb" => Ok(Self::AniDb),
            "anilist" => Ok(Self::AniList),
            "tvdb" => Ok(Self::Tvdb),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowType {
    Anime,
    #[default]
    Tv,
    Movie,
    Ova,
    Special,
}

impl ShowType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Tv => "tv",
            Self::Movie => "movie",
            Self::Ova => "ova",
            Self::Special => "special",
        }
    }

    /// Strict parse of the stored/wire form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "anime" => Some(Self::Anime),
            "tv" => Some(Self::Tv),
            "movie" => Some(Self::Movie),
            "ova" => Some(Self::Ova),
            "special" => Some(Self::Special),
            _ => None,
        }
    }

    /// Lenient mapping of upstream type labels; anything unrecognized is `Tv`.
    #[must_use]
    pub fn from_upstream(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::Tv)
    }
}

impl fmt::Display for ShowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowStatus {
    #[default]
    Ongoing,
    Finished,
}

impl ShowStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an upstream status spelling onto [`ShowStatus`].
///
/// Matching is case-insensitive and ignores surrounding whitespace.
#[must_use]
pub fn normalize_status(value: &str) -> Option<ShowStatus> {
    match value.trim().to_lowercase().as_str() {
        "ongoing" | "releasing" | "continuing" | "upcoming" | "in production"
        | "returning series" | "current series" => Some(ShowStatus::Ongoing),
        "finished" | "ended" | "completed" | "cancelled" | "canceled" => {
            Some(ShowStatus::Finished)
        }
        _ => None,
    }
}

#[must_use]
pub fn normalize_status_or_default(value: &str, fallback: ShowStatus) -> ShowStatus {
    normalize_status(value).unwrap_or(fallback)
}

/// Lifecycle state of a show ingestion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
