use crate::domain::ProviderName;
use serde::{Deserialize, Serialize};

/// Normalized episode produced by a metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub provider: ProviderName,
    pub external_id: String,
    pub season_number: i64,
    pub episode_number: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<i64>,
}

impl Episode {
    /// Title used when upstream does not name the episode.
    #[must_use]
    pub fn fallback_title(episode_number: i64) -> String {
        format!("Episode {episode_number}")
    }
}

/// Sorts by `(season_number, episode_number)` ascending.
pub fn sort_episodes(episodes: &mut [Episode]) {
    episodes.sort_by_key(|episode| (episode.season_number, episode.episode_number));
}

/// Id container persisted alongside an episode row.
///
/// Rows created from a provider listing carry `externalId`; rows created by
/// hand may carry numeric upstream ids instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeExternalIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anilist: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb: Option<i64>,
}

/// Payload for creating or replacing an episode row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeInput {
    pub show_id: String,
    pub season_number: i64,
    pub episode_number: i64,
    pub title: String,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub runtime_minutes: Option<i64>,
    #[serde(default)]
    pub external_ids: EpisodeExternalIds,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEpisode {
    pub internal_episode_id: String,
    pub show_id: String,
    pub season_number: i64,
    pub episode_number: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<i64>,
    pub external_ids: EpisodeExternalIds,
    pub created_at: String,
    pub updated_at: String,
}
