use crate::domain::ProviderName;
use crate::metadata::MetadataError;
use crate::models::{Episode, Show};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOpts {
    pub page: i64,
    pub limit: i64,
}

pub type DiscoverOpts = SearchOpts;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListEpisodesOpts {
    pub page: i64,
    pub limit: i64,
    pub season_number: Option<i64>,
}

/// Curated lists returned by a provider's discover feed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverResult {
    pub trending: Vec<Show>,
    pub popular: Vec<Show>,
    pub top_rated: Vec<Show>,
    pub upcoming: Vec<Show>,
    pub currently_airing: Vec<Show>,
}

/// Uniform contract over every upstream metadata source.
///
/// Implementations normalize into [`Show`] / [`Episode`], clamp paging to
/// their own bounds and tag every failure with an [`crate::metadata::ErrorKind`].
/// All methods are cancel-safe: dropping the returned future aborts any
/// in-flight upstream request.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn name(&self) -> ProviderName;

    /// Blank queries return an empty list without calling upstream.
    async fn search(&self, query: &str, opts: SearchOpts) -> Result<Vec<Show>, MetadataError>;

    async fn discover(&self, _opts: DiscoverOpts) -> Result<DiscoverResult, MetadataError> {
        Err(MetadataError::NotSupported(format!(
            "{} provider does not support discover",
            self.name()
        )))
    }

    async fn get_show(&self, external_id: &str) -> Result<Show, MetadataError>;

    /// Episodes sorted by `(season, episode)`; the season filter is applied
    /// after the upstream fetch.
    async fn list_episodes(
        &self,
        external_id: &str,
        opts: ListEpisodesOpts,
    ) -> Result<Vec<Episode>, MetadataError>;
}
